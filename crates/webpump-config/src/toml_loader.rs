//! TOML config file loading.

use crate::schema::WebpumpConfig;
use crate::validation;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use webpump_common::ConfigError;

/// Load config from a specific TOML file path.
///
/// Deserializes the file using serde defaults for any missing fields, then
/// validates it. Unlike a missing default file, an explicitly named file
/// that does not exist is an error.
pub fn load_from_path(path: &Path) -> Result<WebpumpConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::ParseError(format!("failed to read {}: {e}", path.display()))
    })?;

    let config = parse_toml(&content)?;
    validation::validate(&config)?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Parse a config from TOML text without touching the filesystem.
pub fn parse_toml(content: &str) -> Result<WebpumpConfig, ConfigError> {
    toml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))
}

/// Load config from the platform-specific default path.
///
/// On macOS: `~/Library/Application Support/webpump/config.toml`
/// On Linux: `~/.config/webpump/config.toml`
///
/// A missing file is not an error; defaults are returned and nothing is
/// written to disk.
pub fn load_default() -> Result<WebpumpConfig, ConfigError> {
    let path = default_config_path()?;

    if !path.exists() {
        debug!("no config found at {}, using defaults", path.display());
        return Ok(WebpumpConfig::default());
    }

    load_from_path(&path)
}

/// Get the platform-specific default config file path.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("webpump").join("config.toml"))
}
