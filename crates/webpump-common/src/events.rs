//! Window lifecycle events and their wire shape.
//!
//! On the wire an event is `{ "kind": "<name>" }`. The known names are
//! `close`, `windowCreated` and `domContentLoaded`; anything else is kept
//! verbatim in [`EventKind::Other`] so newer engines never break older
//! consumers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// The user (or the OS) asked for the window to close.
    Close,
    /// The native window has been created.
    WindowCreated,
    /// The initial document finished loading.
    ContentLoaded,
    /// A kind this build does not know about.
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Close => "close",
            Self::WindowCreated => "windowCreated",
            Self::ContentLoaded => "domContentLoaded",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for EventKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "close" => Self::Close,
            "windowCreated" => Self::WindowCreated,
            "domContentLoaded" => Self::ContentLoaded,
            _ => Self::Other(name),
        }
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lifecycle event drained from an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
}

impl Event {
    pub fn new(kind: impl Into<EventKind>) -> Self {
        Self { kind: kind.into() }
    }

    pub fn close() -> Self {
        Self::new(EventKind::Close)
    }

    pub fn window_created() -> Self {
        Self::new(EventKind::WindowCreated)
    }

    pub fn content_loaded() -> Self {
        Self::new(EventKind::ContentLoaded)
    }

    /// Parse an event from its JSON wire form.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_use_wire_names() {
        assert_eq!(
            serde_json::to_string(&Event::close()).unwrap(),
            r#"{"kind":"close"}"#
        );
        assert_eq!(
            serde_json::to_string(&Event::window_created()).unwrap(),
            r#"{"kind":"windowCreated"}"#
        );
        assert_eq!(
            serde_json::to_string(&Event::content_loaded()).unwrap(),
            r#"{"kind":"domContentLoaded"}"#
        );
    }

    #[test]
    fn parses_known_kinds() {
        let event = Event::from_json(r#"{"kind":"domContentLoaded"}"#).unwrap();
        assert_eq!(event.kind, EventKind::ContentLoaded);

        let event = Event::from_json(r#"{"kind":"close"}"#).unwrap();
        assert_eq!(event.kind, EventKind::Close);
    }

    #[test]
    fn unknown_kind_is_preserved() {
        let event = Event::from_json(r#"{"kind":"titleChanged"}"#).unwrap();
        assert_eq!(event.kind, EventKind::Other("titleChanged".into()));

        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"kind":"titleChanged"}"#);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let event = Event::from_json(r#"{"kind":"close","reason":"user"}"#).unwrap();
        assert_eq!(event, Event::close());
    }

    #[test]
    fn missing_kind_is_rejected() {
        let err = Event::from_json(r#"{"type":"close"}"#).unwrap_err();
        assert!(err.to_string().contains("kind"));
        assert!(Event::from_json("not json").is_err());
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(EventKind::WindowCreated.to_string(), "windowCreated");
        assert_eq!(EventKind::Other("resize".into()).to_string(), "resize");
    }
}
