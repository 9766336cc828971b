use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A user of the service. Always belongs to exactly one organization.
///
/// Credentials are not part of this struct; they stay inside `om-db`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub organization_id: String,
    pub full_name: String,
    pub is_admin: bool,
}
