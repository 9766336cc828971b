//! Salted password hashes for the login path.
//!
//! Stored form: `base64(salt)$base64(HMAC-SHA256(salt, password))`, with a
//! 16-byte random salt. Verification compares MACs in constant time.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

const SALT_LEN: usize = 16;
const SEPARATOR: char = '$';

fn keyed(salt: &[u8], password: &str) -> Result<HmacSha256, AuthError> {
    let mut mac =
        HmacSha256::new_from_slice(salt).map_err(|e| AuthError::KeyDerivation(e.to_string()))?;
    mac.update(password.as_bytes());
    Ok(mac)
}

/// Hash `password` with a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::KeyDerivation` if the OS random source fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::fill(&mut salt)
        .map_err(|e| AuthError::KeyDerivation(format!("failed to generate salt: {e}")))?;
    hash_password_with_salt(&salt, password)
}

/// Hash `password` with a caller-provided salt.
///
/// # Errors
///
/// Returns `AuthError::KeyDerivation` if the MAC cannot be keyed.
pub fn hash_password_with_salt(salt: &[u8], password: &str) -> Result<String, AuthError> {
    let digest = keyed(salt, password)?.finalize().into_bytes();
    Ok(format!(
        "{}{SEPARATOR}{}",
        STANDARD.encode(salt),
        STANDARD.encode(digest)
    ))
}

/// Check `password` against a stored hash. Malformed hashes never verify.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once(SEPARATOR) else {
        return false;
    };
    let (Ok(salt), Ok(digest)) = (STANDARD.decode(salt), STANDARD.decode(digest)) else {
        return false;
    };
    keyed(&salt, password).is_ok_and(|mac| mac.verify_slice(&digest).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let stored = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("correct horse ", &stored));
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password("pw").unwrap();
        let b = hash_password("pw").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("pw", &a));
        assert!(verify_password("pw", &b));
    }

    #[test]
    fn fixed_salt_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        assert_eq!(
            hash_password_with_salt(&salt, "pw").unwrap(),
            hash_password_with_salt(&salt, "pw").unwrap()
        );
    }

    #[test]
    fn malformed_hash_does_not_verify() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "no-separator"));
        assert!(!verify_password("pw", "!!!$???"));
        assert!(!verify_password("pw", "c2FsdA==$"));
    }
}
