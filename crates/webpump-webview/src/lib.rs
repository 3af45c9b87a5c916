//! Native window engine for webpump.
//!
//! [`WebViewEngine`] implements [`webpump_bridge::WindowEngine`] on top of
//! `winit` and `wry`:
//! - one native window with an embedded webview per engine
//! - a non-blocking `advance` built on winit's pump-events extension
//! - a `webpump://` custom protocol serving local files
//! - lifecycle events buffered until the bridge drains them
//! - standalone executables that carry their site as embedded assets

pub mod bundle;
pub mod content;
pub mod engine;
pub mod events;
pub mod standalone;

pub use bundle::EmbeddedAssets;
pub use content::{ContentProvider, PROTOCOL};
pub use engine::WebViewEngine;
pub use events::EventSink;
pub use standalone::Standalone;
