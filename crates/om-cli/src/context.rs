use std::sync::Arc;

use om_auth::SessionCache;
use om_config::OmConfig;
use om_db::OmService;

use crate::api::Api;

/// Everything a command handler needs: resolved config and the opened store.
pub struct AppContext {
    pub config: OmConfig,
    pub service: Arc<OmService>,
}

impl AppContext {
    /// Open the store. With `require_secret`, refuse to start without `auth.secret`.
    pub async fn init(config: OmConfig, require_secret: bool) -> anyhow::Result<Self> {
        if require_secret {
            config.ensure_ready()?;
        } else {
            config.database.validate()?;
        }

        let service = OmService::open(&config.database).await?;
        tracing::debug!(path = %config.database.path, "store ready");

        Ok(Self {
            config,
            service: Arc::new(service),
        })
    }

    /// Request boundary over this store with a fresh session cache.
    #[must_use]
    pub fn api(&self) -> Api {
        Api::new(
            Arc::clone(&self.service),
            Arc::new(SessionCache::new()),
            self.config.auth.secret.clone(),
        )
    }
}
