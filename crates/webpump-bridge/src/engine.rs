//! The contract between the poll bridge and a native window engine.
//!
//! An engine owns exactly one OS-level window and its message loop. The
//! bridge only ever crosses into it through [`WindowEngine::advance`] and
//! [`WindowEngine::drain_events`]; everything else about the window stays
//! engine-internal.

use std::fmt;
use std::path::{Path, PathBuf};

use webpump_common::{EngineError, Event, WindowHandle};

/// Where a window's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Anything carrying a URL scheme (`https:`, `file:`, `about:`, ...).
    Url(String),
    /// A local file, usually an HTML entry point.
    Path(PathBuf),
}

impl ContentSource {
    /// Classify a user-supplied source string.
    ///
    /// A string is a URL when it starts with a scheme of at least two
    /// characters followed by `:`. Single-letter schemes are treated as
    /// Windows drive letters (`C:\site\index.html`).
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.split_once(':') {
            Some((scheme, _)) if is_scheme(scheme) => Self::Url(raw.to_string()),
            _ => Self::Path(PathBuf::from(raw)),
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Url(_) => None,
        }
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_alpha
        && s.len() > 1
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A native window engine driven one step at a time.
///
/// Implementations must never block in [`advance`](Self::advance) or
/// [`drain_events`](Self::drain_events): the caller's whole cooperative loop
/// stalls for as long as either call runs.
pub trait WindowEngine {
    /// Synchronously construct a window backed by `source`.
    ///
    /// Fails with [`EngineError::Init`] when the windowing subsystem cannot
    /// be initialized.
    fn create(&mut self, source: &ContentSource) -> Result<WindowHandle, EngineError>;

    /// Process one bounded unit of OS messages for the window.
    ///
    /// Returns `true` while the window is open and `false` once it has
    /// closed. Calling again after `false` was returned yields
    /// [`EngineError::StaleHandle`].
    fn advance(&mut self, handle: WindowHandle) -> Result<bool, EngineError>;

    /// Return every event recorded since the previous drain, oldest first,
    /// and clear the buffer.
    ///
    /// The events of the step that reported closure can still be drained
    /// once; any later call yields [`EngineError::StaleHandle`].
    fn drain_events(&mut self, handle: WindowHandle) -> Result<Vec<Event>, EngineError>;
}

impl<E: WindowEngine + ?Sized> WindowEngine for &mut E {
    fn create(&mut self, source: &ContentSource) -> Result<WindowHandle, EngineError> {
        (**self).create(source)
    }

    fn advance(&mut self, handle: WindowHandle) -> Result<bool, EngineError> {
        (**self).advance(handle)
    }

    fn drain_events(&mut self, handle: WindowHandle) -> Result<Vec<Event>, EngineError> {
        (**self).drain_events(handle)
    }
}

impl<E: WindowEngine + ?Sized> WindowEngine for Box<E> {
    fn create(&mut self, source: &ContentSource) -> Result<WindowHandle, EngineError> {
        (**self).create(source)
    }

    fn advance(&mut self, handle: WindowHandle) -> Result<bool, EngineError> {
        (**self).advance(handle)
    }

    fn drain_events(&mut self, handle: WindowHandle) -> Result<Vec<Event>, EngineError> {
        (**self).drain_events(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_urls() {
        assert_eq!(
            ContentSource::parse("https://example.com/index.html"),
            ContentSource::Url("https://example.com/index.html".into())
        );
        assert_eq!(
            ContentSource::parse("about:blank"),
            ContentSource::Url("about:blank".into())
        );
        assert_eq!(
            ContentSource::parse("data:text/html,<h1>hi</h1>"),
            ContentSource::Url("data:text/html,<h1>hi</h1>".into())
        );
        assert_eq!(
            ContentSource::parse("file:///tmp/index.html"),
            ContentSource::Url("file:///tmp/index.html".into())
        );
    }

    #[test]
    fn parses_local_paths() {
        assert_eq!(
            ContentSource::parse("./examples/project1/src/index.html"),
            ContentSource::Path(PathBuf::from("./examples/project1/src/index.html"))
        );
        assert_eq!(
            ContentSource::parse("index.html"),
            ContentSource::Path(PathBuf::from("index.html"))
        );
    }

    #[test]
    fn drive_letters_are_paths() {
        let source = ContentSource::parse(r"C:\site\index.html");
        assert!(source.as_path().is_some());
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(
            ContentSource::parse("  about:blank \n"),
            ContentSource::Url("about:blank".into())
        );
    }

    #[test]
    fn display_round_trips_input() {
        assert_eq!(ContentSource::parse("about:blank").to_string(), "about:blank");
        assert_eq!(ContentSource::parse("site/index.html").to_string(), "site/index.html");
    }
}
