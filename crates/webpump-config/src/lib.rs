//! webpump configuration.
//!
//! TOML-based configuration for the poll bridge, the native window and
//! logging. Every section uses serde defaults, so an empty or partial file
//! is valid.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use webpump_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    BridgeConfig, LogLevel, LoggingConfig, WebpumpConfig, WindowConfig, CONFIG_SCHEMA_VERSION,
};

use std::path::Path;

use webpump_common::ConfigError;

/// Load config from `path` if given, otherwise from the platform default
/// location. Any file that is read is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<WebpumpConfig, ConfigError> {
    match path {
        Some(path) => toml_loader::load_from_path(path),
        None => toml_loader::load_default(),
    }
}

/// Replace `[bridge] interval_ms` with a command-line value.
///
/// The result goes through the same validation as a config file, so both
/// sources share one accepted range.
pub fn apply_interval_override(
    config: &mut WebpumpConfig,
    interval_ms: Option<i64>,
) -> Result<(), ConfigError> {
    if let Some(interval_ms) = interval_ms {
        config.bridge.interval_ms = interval_ms;
        validation::validate(config)?;
    }
    Ok(())
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &WebpumpConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let config = WebpumpConfig::default();
        let json = config_to_json(&config);
        assert!(json.contains("\"bridge\""));
        assert!(json.contains("\"window\""));
        assert!(json.contains("\"logging\""));
        assert!(json.contains("\"interval_ms\": 1"));
    }

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let config = WebpumpConfig::default();
        let json = config_to_json(&config);
        let parsed: WebpumpConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.bridge.interval_ms, 1);
        assert_eq!(parsed.window.title, "webpump");
        assert_eq!(parsed.logging.level, LogLevel::Info);
    }

    #[test]
    fn load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webpump.toml");
        std::fs::write(&path, "[bridge]\ninterval_ms = 16\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.bridge.interval_ms, 16);
    }

    #[test]
    fn interval_override_replaces_configured_value() {
        let mut config = WebpumpConfig::default();
        apply_interval_override(&mut config, Some(16)).unwrap();
        assert_eq!(config.bridge.interval_ms, 16);

        apply_interval_override(&mut config, None).unwrap();
        assert_eq!(config.bridge.interval_ms, 16);
    }

    #[test]
    fn interval_override_uses_config_bounds() {
        let mut config = WebpumpConfig::default();
        let err = apply_interval_override(&mut config, Some(60_000)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref msg) if msg.contains("60000")));

        let err = apply_interval_override(&mut config, Some(0)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
