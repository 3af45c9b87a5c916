use std::path::PathBuf;

use crate::handle::WindowHandle;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("invalid poll interval: {0} ms (must be greater than zero)")]
    InvalidInterval(i64),
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine init error: {0}")]
    Init(String),

    #[error("stale window handle: {0} has already reported termination")]
    StaleHandle(WindowHandle),

    #[error("unknown window handle: {0}")]
    UnknownHandle(WindowHandle),
}

/// Error raised by caller-supplied event handling logic.
#[derive(Debug, thiserror::Error)]
#[error("event handler failed: {message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    /// Create a handler error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error raised while handling an event.
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        let source = source.into();
        Self {
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl BridgeError {
    pub fn is_stale_handle(&self) -> bool {
        matches!(self, Self::Engine(EngineError::StaleHandle(_)))
    }
}

/// Errors while packing a site into a standalone executable or reading it
/// back.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("entry file not found: {0}")]
    EntryNotFound(PathBuf),

    #[error("failed to read asset {path}: {source}")]
    AssetRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot compile: {0} is a directory")]
    OutputIsDirectory(PathBuf),

    #[error("cannot compile: refusing to overwrite {0}, it is not a webpump standalone")]
    RefuseOverwrite(PathBuf),

    #[error("corrupt bundle: {0}")]
    Corrupt(String),

    #[error("bundle manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum WebpumpError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<EngineError> for WebpumpError {
    fn from(err: EngineError) -> Self {
        Self::Bridge(BridgeError::Engine(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::InvalidInterval(0);
        assert_eq!(
            err.to_string(),
            "invalid poll interval: 0 ms (must be greater than zero)"
        );
    }

    #[test]
    fn engine_error_display() {
        let err = EngineError::Init("no display".into());
        assert_eq!(err.to_string(), "engine init error: no display");

        let handle = WindowHandle::next();
        let err = EngineError::StaleHandle(handle);
        assert!(err.to_string().contains(&handle.to_string()));
    }

    #[test]
    fn handler_error_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = HandlerError::new(io_err);
        assert_eq!(err.message(), "disk full");
        assert_eq!(err.to_string(), "event handler failed: disk full");
        assert!(err.source().is_some());

        let err = HandlerError::msg("boom");
        assert!(err.source().is_none());
    }

    #[test]
    fn bridge_error_from_parts() {
        let err: BridgeError = ConfigError::InvalidInterval(-5).into();
        assert!(matches!(err, BridgeError::Config(ConfigError::InvalidInterval(-5))));

        let err: BridgeError = EngineError::StaleHandle(WindowHandle::next()).into();
        assert!(err.is_stale_handle());

        let err: BridgeError = HandlerError::msg("bad").into();
        assert!(!err.is_stale_handle());
        assert_eq!(err.to_string(), "event handler failed: bad");
    }

    #[test]
    fn webpump_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: WebpumpError = io_err.into();
        assert!(matches!(err, WebpumpError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn webpump_error_from_engine() {
        let err: WebpumpError = EngineError::Init("no display".into()).into();
        assert!(matches!(err, WebpumpError::Bridge(BridgeError::Engine(_))));
    }

    #[test]
    fn bundle_error_display() {
        let err = BundleError::RefuseOverwrite(PathBuf::from("/usr/bin/ls"));
        assert_eq!(
            err.to_string(),
            "cannot compile: refusing to overwrite /usr/bin/ls, it is not a webpump standalone"
        );

        let err: WebpumpError = BundleError::Corrupt("offsets out of range".into()).into();
        assert!(matches!(err, WebpumpError::Bundle(_)));
        assert_eq!(err.to_string(), "corrupt bundle: offsets out of range");
    }
}
