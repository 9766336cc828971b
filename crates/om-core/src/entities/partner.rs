use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An external stakeholder tracked per project, with its full marker tree.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BoundaryPartner {
    pub boundary_partner_id: String,
    pub project_id: String,
    pub partner_name: String,
    /// Empty string when no statement has been written yet.
    pub outcome_statement: String,
    /// Markers in creation order. `order_number` is the user-facing position.
    #[serde(default)]
    pub progress_markers: Vec<ProgressMarker>,
}

/// An ordered milestone belonging to a boundary partner.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ProgressMarker {
    pub progress_marker_id: String,
    pub boundary_partner_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: i64,
    /// 1-based, dense and unique within the owning partner.
    pub order_number: u32,
    #[serde(default)]
    pub challenges: Vec<Challenge>,
    #[serde(default)]
    pub strategies: Vec<Strategy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Challenge {
    pub challenge_id: String,
    pub progress_marker_id: String,
    pub challenge_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Strategy {
    pub strategy_id: String,
    pub progress_marker_id: String,
    pub strategy_name: String,
}
