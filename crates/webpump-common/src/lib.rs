pub mod errors;
pub mod events;
pub mod handle;
pub mod limits;

pub use errors::{BridgeError, BundleError, ConfigError, EngineError, HandlerError, WebpumpError};
pub use events::{Event, EventKind};
pub use handle::WindowHandle;
