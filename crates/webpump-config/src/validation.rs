//! Configuration validation.
//!
//! Checks numeric ranges and collects every problem into a single
//! `ConfigError::ValidationError`.

use crate::schema::WebpumpConfig;
use webpump_common::limits::MAX_INTERVAL_MS;
use webpump_common::ConfigError;

const MIN_WINDOW_DIM: u32 = 100;
const MAX_WINDOW_DIM: u32 = 16384;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &WebpumpConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_bridge(&mut errors, config);
    validate_window(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_bridge(errors: &mut Vec<String>, config: &WebpumpConfig) {
    let value = config.bridge.interval_ms;
    if !(1..=MAX_INTERVAL_MS).contains(&value) {
        errors.push(format!(
            "bridge.interval_ms = {value} is out of range [1, {MAX_INTERVAL_MS}]"
        ));
    }
}

fn validate_window(errors: &mut Vec<String>, config: &WebpumpConfig) {
    validate_range(
        errors,
        "window.width",
        config.window.width,
        MIN_WINDOW_DIM,
        MAX_WINDOW_DIM,
    );
    validate_range(
        errors,
        "window.height",
        config.window.height,
        MIN_WINDOW_DIM,
        MAX_WINDOW_DIM,
    );
}

/// Push an error if `value` is outside `[min, max]`.
fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
