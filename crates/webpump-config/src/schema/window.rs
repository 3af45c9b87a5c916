//! Native window configuration types.

use serde::{Deserialize, Serialize};

/// Window appearance and webview behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Static window title.
    pub title: String,
    /// Initial inner width in logical pixels (valid range: 100-16384).
    pub width: u32,
    /// Initial inner height in logical pixels (valid range: 100-16384).
    pub height: u32,
    pub resizable: bool,
    /// Enable webview dev tools (always on in debug builds).
    pub devtools: bool,
    /// Transparent webview background.
    pub transparent: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "webpump".into(),
            width: 800,
            height: 600,
            resizable: true,
            devtools: cfg!(debug_assertions),
            transparent: false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
