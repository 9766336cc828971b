//! Wire shapes of the line-delimited request boundary.
//!
//! Request line: `{"id": "...", "api_key": "...", "op": "<operation>", ...params}`.
//! Response line: `{"id": "...", "status": <u16>, "data": ..., "message": "..."}`.

use om_core::entities::NewProject;
use om_core::responses::Response;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Echoed back on the response so callers can correlate out-of-order replies.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(flatten)]
    pub operation: Operation,
}

impl Request {
    /// Decode one request line. On failure the reply still carries the
    /// request id when the line was valid JSON with a string `id`.
    pub fn parse_line(line: &str) -> Result<Self, Reply> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| Reply::from_error(None, &ApiError::BadRequest(e.to_string())))?;
        Self::from_value(value)
    }

    /// Decode a request already parsed as JSON.
    pub fn from_value(value: Value) -> Result<Self, Reply> {
        let id = value.get("id").and_then(Value::as_str).map(str::to_string);
        serde_json::from_value(value)
            .map_err(|e| Reply::from_error(id, &ApiError::BadRequest(e.to_string())))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Login {
        email: String,
        password: String,
    },
    ListProjects,
    AddProject {
        project: NewProject,
    },
    DeleteProject {
        project_id: String,
    },
    AddBoundaryPartner {
        project_id: String,
        partner_name: String,
    },
    GetBoundaryPartner {
        project_id: String,
        boundary_partner_id: String,
    },
    DeleteBoundaryPartner {
        project_id: String,
        boundary_partner_id: String,
    },
    AddProgressMarker {
        project_id: String,
        boundary_partner_id: String,
        title: String,
        #[serde(rename = "type", default)]
        kind: i64,
    },
    MoveProgressMarker {
        project_id: String,
        progress_marker_id: String,
        order_number: u32,
        #[serde(default)]
        title: Option<String>,
        #[serde(rename = "type", default)]
        kind: Option<i64>,
    },
    DeleteProgressMarker {
        project_id: String,
        progress_marker_id: String,
    },
    AddChallenge {
        project_id: String,
        progress_marker_id: String,
        challenge_name: String,
    },
    DeleteChallenge {
        project_id: String,
        challenge_id: String,
    },
    AddStrategy {
        project_id: String,
        progress_marker_id: String,
        strategy_name: String,
    },
    DeleteStrategy {
        project_id: String,
        strategy_id: String,
    },
}

impl Operation {
    /// The `op` tag, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::ListProjects => "list_projects",
            Self::AddProject { .. } => "add_project",
            Self::DeleteProject { .. } => "delete_project",
            Self::AddBoundaryPartner { .. } => "add_boundary_partner",
            Self::GetBoundaryPartner { .. } => "get_boundary_partner",
            Self::DeleteBoundaryPartner { .. } => "delete_boundary_partner",
            Self::AddProgressMarker { .. } => "add_progress_marker",
            Self::MoveProgressMarker { .. } => "move_progress_marker",
            Self::DeleteProgressMarker { .. } => "delete_progress_marker",
            Self::AddChallenge { .. } => "add_challenge",
            Self::DeleteChallenge { .. } => "delete_challenge",
            Self::AddStrategy { .. } => "add_strategy",
            Self::DeleteStrategy { .. } => "delete_strategy",
        }
    }
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: Option<String>,
    pub status: u16,
    pub data: Option<Value>,
    pub message: String,
}

impl Reply {
    #[must_use]
    pub fn from_response(id: Option<String>, response: Response<Value>) -> Self {
        Self {
            id,
            status: response.status.code(),
            data: response.body.data,
            message: response.body.message,
        }
    }

    #[must_use]
    pub fn from_error(id: Option<String>, error: &ApiError) -> Self {
        Self {
            id,
            status: error.status().code(),
            data: None,
            message: error.message(),
        }
    }
}
