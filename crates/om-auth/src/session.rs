//! In-process API key → user id map.
//!
//! One reader-writer lock guards the whole map: lookups share it, inserts take
//! it exclusively. Entries never expire and are not persisted; a restart
//! forgets every session.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::api_key::derive_api_key;
use crate::error::AuthError;

#[derive(Debug, Default)]
pub struct SessionCache {
    entries: RwLock<HashMap<String, String>>,
}

impl SessionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// User id bound to `api_key`, if any.
    #[must_use]
    pub fn get(&self, api_key: &str) -> Option<String> {
        self.entries.read().get(api_key).cloned()
    }

    /// Bind `api_key` to `user_id`, replacing any earlier binding.
    pub fn set(&self, api_key: impl Into<String>, user_id: impl Into<String>) {
        self.entries.write().insert(api_key.into(), user_id.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Derive the key for `user_id`, bind it, and return it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeyDerivation` if the key cannot be derived.
    pub fn issue(&self, secret: &str, user_id: &str) -> Result<String, AuthError> {
        let key = derive_api_key(secret, user_id)?;
        self.set(key.clone(), user_id);
        tracing::debug!(user_id, sessions = self.len(), "issued api key");
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn get_unknown_is_none() {
        let cache = SessionCache::new();
        assert!(cache.get("nope").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn set_then_get() {
        let cache = SessionCache::new();
        cache.set("k1", "usr-1");
        assert_eq!(cache.get("k1").as_deref(), Some("usr-1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn issue_is_idempotent_per_user() {
        let cache = SessionCache::new();
        let first = cache.issue("s3cret", "usr-1").unwrap();
        let second = cache.issue("s3cret", "usr-1").unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&first).as_deref(), Some("usr-1"));
    }

    #[test]
    fn concurrent_readers_and_writers() {
        let cache = Arc::new(SessionCache::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("key-{t}-{i}");
                        cache.set(key.clone(), format!("usr-{t}-{i}"));
                        assert_eq!(cache.get(&key), Some(format!("usr-{t}-{i}")));
                        let _ = cache.get("key-0-0");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 8 * 200);
        for t in 0..8 {
            for i in 0..200 {
                assert_eq!(
                    cache.get(&format!("key-{t}-{i}")),
                    Some(format!("usr-{t}-{i}"))
                );
            }
        }
    }
}
