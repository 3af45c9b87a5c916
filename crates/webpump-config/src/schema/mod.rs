//! Configuration schema types for webpump.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod bridge;
mod logging;
mod window;

pub use bridge::*;
pub use logging::*;
pub use window::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for webpump.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct WebpumpConfig {
    pub bridge: BridgeConfig,
    pub window: WindowConfig,
    pub logging: LoggingConfig,
}
