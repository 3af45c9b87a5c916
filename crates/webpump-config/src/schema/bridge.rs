//! Poll bridge configuration.

use serde::{Deserialize, Serialize};
use webpump_common::limits::DEFAULT_INTERVAL_MS;

/// Settings for the cooperative poll loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Tick period in milliseconds (valid range: 1-1000).
    pub interval_ms: i64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}
