use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;

const CONFIG_DIR: &str = "soop";
const CONFIG_FILE: &str = "config.toml";
const TOKEN_ENV: &str = "GITHUB_TOKEN";

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load the configuration from `path`, or from the default location.
///
/// A missing default file yields the defaults; a missing explicit file is
/// an error.
pub fn load(path: Option<&Path>) -> color_eyre::Result<AppConfig> {
    let mut config = match path {
        Some(path) => parse(&fs::read_to_string(path)?)?,
        None => load_default()?,
    };

    if config.github.token.is_none() {
        config.github.token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty());
    }
    Ok(config)
}

fn load_default() -> color_eyre::Result<AppConfig> {
    let Some(path) = config_path() else {
        tracing::debug!("No config directory found, using defaults");
        return Ok(AppConfig::default());
    };

    if !path.exists() {
        tracing::debug!("Config file not found at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    let config = parse(&fs::read_to_string(&path)?)?;
    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

fn parse(content: &str) -> color_eyre::Result<AppConfig> {
    let mut config: AppConfig = toml::from_str(content)?;
    config.ui.sanitize();
    Ok(config)
}
