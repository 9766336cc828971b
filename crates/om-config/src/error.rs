use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file or `OMAP_*` variable could not be parsed into [`crate::OmConfig`].
    #[error("failed to load omap config: {0}")]
    Load(#[from] figment::Error),

    /// `auth.secret` is empty. API keys cannot be derived without it.
    #[error("auth.secret is not set (add it to omap.toml or export OMAP_AUTH__SECRET)")]
    MissingSecret,

    #[error("bad value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
