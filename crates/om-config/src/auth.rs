//! Session key derivation configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Shared secret keying the HMAC that derives API keys from user ids.
    #[serde(default)]
    pub secret: String,
}

impl AuthConfig {
    /// Check if a secret is available for issuing API keys.
    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }
}
