use om_config::OmConfig;

use crate::cli::GlobalFlags;

/// Load layered configuration (with `.env`) and apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<OmConfig> {
    let config = OmConfig::load_with_dotenv()?;
    Ok(apply_overrides(config, flags))
}

fn apply_overrides(mut config: OmConfig, flags: &GlobalFlags) -> OmConfig {
    if let Some(path) = &flags.db {
        config.database.path.clone_from(path);
    }
    config
}
