//! Caller-supplied event handling.
//!
//! The bridge hands every drained event to an [`EventHandler`]. It never
//! interprets events itself; reacting to `close` (for example by asking the
//! host to exit) is entirely the handler's business.

use tokio::sync::mpsc;
use tracing::warn;

use webpump_common::{Event, HandlerError};

/// Receives events from a running poll session, one call per event.
///
/// Returning an error aborts the session: no further events from the same
/// tick or later ticks are delivered and the error surfaces to whoever is
/// awaiting the session. Wrap the handler in [`Guarded`] to keep going
/// instead.
pub trait EventHandler {
    fn on_event(&mut self, event: &Event) -> Result<(), HandlerError>;
}

impl<F> EventHandler for F
where
    F: FnMut(&Event) -> Result<(), HandlerError>,
{
    fn on_event(&mut self, event: &Event) -> Result<(), HandlerError> {
        self(event)
    }
}

/// Handler adapter that logs and swallows errors from the wrapped handler.
pub struct Guarded<H> {
    inner: H,
    failures: u64,
}

impl<H: EventHandler> Guarded<H> {
    pub fn new(inner: H) -> Self {
        Self { inner, failures: 0 }
    }

    /// How many events the wrapped handler failed on so far.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: EventHandler> EventHandler for Guarded<H> {
    fn on_event(&mut self, event: &Event) -> Result<(), HandlerError> {
        if let Err(e) = self.inner.on_event(event) {
            self.failures += 1;
            warn!(kind = %event.kind, error = %e, "event handler failed, continuing");
        }
        Ok(())
    }
}

/// Forwards events into a channel so a separate task can consume them.
///
/// Fails once the receiving side has been dropped.
pub struct ChannelHandler {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelHandler {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { tx }
    }

    /// Create a handler together with the receiver it feeds.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl EventHandler for ChannelHandler {
    fn on_event(&mut self, event: &Event) -> Result<(), HandlerError> {
        self.tx
            .send(event.clone())
            .map_err(|_| HandlerError::msg("event receiver dropped"))
    }
}
