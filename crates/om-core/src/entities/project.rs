use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A project owned by an organization, with its boundary partners aggregated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Project {
    pub project_id: String,
    pub project_name: String,
    pub logo_url: Option<String>,
    pub description: String,
    pub budget: f64,
    pub donor: String,
    pub vision: String,
    pub mission: String,
    pub timeline_from: Option<DateTime<Utc>>,
    pub timeline_to: Option<DateTime<Utc>>,
    /// Partner IDs in partner creation order.
    #[serde(default)]
    pub boundary_partner_ids: Vec<String>,
    /// Partner names, parallel to `boundary_partner_ids`.
    #[serde(default)]
    pub boundary_partner_names: Vec<String>,
}

/// Request body for adding a project. The owning organization comes from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewProject {
    pub project_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub donor: String,
    #[serde(default)]
    pub vision: String,
    #[serde(default)]
    pub mission: String,
}
