use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Derive the API key for `user_id`.
///
/// The key is `base64(HMAC-SHA256(secret, user_id))` with the standard padded
/// alphabet. It is deterministic: logging in twice yields the same key, and a
/// key handed out earlier stays valid.
///
/// # Errors
///
/// Returns `AuthError::KeyDerivation` if the MAC cannot be keyed.
pub fn derive_api_key(secret: &str, user_id: &str) -> Result<String, AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AuthError::KeyDerivation(e.to_string()))?;
    mac.update(user_id.as_bytes());
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}
