//! General application configuration.

use serde::{Deserialize, Serialize};

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Log level used when `OMAP_LOG` is not set and no `--verbose`/`--quiet` flag is given.
    #[serde(default = "default_log_level")]
    pub default_log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.default_log_level, "warn");
    }
}
