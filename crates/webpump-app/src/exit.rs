//! Process-exit capability handed to event handlers.

use std::sync::{Arc, Mutex};

use tracing::debug;
use webpump_bridge::SessionHandle;

#[derive(Debug, Default)]
struct ExitState {
    code: Option<u8>,
    session: Option<SessionHandle>,
}

/// One-way request to end the process once the current session is over.
///
/// Handlers never exit the process themselves. They record a request here;
/// `main` reads it after the session resolves. An attached session is
/// cancelled when exit is requested, so no further ticks run.
#[derive(Debug, Clone, Default)]
pub struct ExitSignal(Arc<Mutex<ExitState>>);

impl ExitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel `session` when exit is requested (immediately if it already was).
    pub fn attach(&self, session: SessionHandle) {
        let Ok(mut state) = self.0.lock() else {
            return;
        };
        if state.code.is_some() {
            session.cancel();
        }
        state.session = Some(session);
    }

    /// Request exit with `code`. The first request wins.
    pub fn request(&self, code: u8) {
        let Ok(mut state) = self.0.lock() else {
            return;
        };
        if state.code.is_some() {
            return;
        }
        debug!(code, "exit requested");
        state.code = Some(code);
        if let Some(session) = &state.session {
            session.cancel();
        }
    }

    pub fn requested(&self) -> Option<u8> {
        self.0.lock().ok().and_then(|state| state.code)
    }
}
