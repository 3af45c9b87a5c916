//! The handler `webpump run` installs: log lifecycle events and request
//! exit when the window closes.

use tracing::{debug, info};
use webpump_bridge::EventHandler;
use webpump_common::{Event, EventKind, HandlerError};

use crate::exit::ExitSignal;

pub struct DemoHandler {
    exit: ExitSignal,
}

impl DemoHandler {
    pub fn new(exit: ExitSignal) -> Self {
        Self { exit }
    }
}

impl EventHandler for DemoHandler {
    fn on_event(&mut self, event: &Event) -> Result<(), HandlerError> {
        match &event.kind {
            EventKind::WindowCreated => info!("window created"),
            EventKind::ContentLoaded => info!("content loaded"),
            EventKind::Close => {
                info!("window close requested, exiting");
                self.exit.request(0);
            }
            EventKind::Other(kind) => debug!(%kind, "unhandled event"),
        }
        Ok(())
    }
}
