use tracing::debug;

use webpump_common::{BridgeError, EngineError, WindowHandle};

use crate::engine::{ContentSource, WindowEngine};
use crate::handler::EventHandler;
use crate::interval::PollInterval;
use crate::session::PollSession;

/// Binds one engine and one window handle to the poll loop.
///
/// At most one session can be active at a time: a session holds the bridge
/// mutably for as long as it lives. Once the window has reported closure
/// the bridge refuses to start new sessions.
pub struct PollBridge<E> {
    pub(crate) engine: E,
    handle: WindowHandle,
    pub(crate) terminated: bool,
}

impl<E: WindowEngine> PollBridge<E> {
    /// Bind to a window the engine has already created.
    pub fn new(engine: E, handle: WindowHandle) -> Self {
        Self {
            engine,
            handle,
            terminated: false,
        }
    }

    /// Create a window from `source` and bind to it.
    pub fn open(mut engine: E, source: &ContentSource) -> Result<Self, EngineError> {
        let handle = engine.create(source)?;
        debug!(%handle, %source, "window created");
        Ok(Self::new(engine, handle))
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    /// Whether the engine has reported that the window closed.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Start a session that delivers every drained event to `handler`,
    /// ticking every `interval_ms` milliseconds.
    ///
    /// Validation happens here, before any tick is scheduled: a
    /// non-positive interval is a configuration error, and a bridge whose
    /// window already closed reports a stale handle.
    pub fn run<'a, H>(
        &'a mut self,
        handler: H,
        interval_ms: i64,
    ) -> Result<PollSession<'a, E>, BridgeError>
    where
        H: EventHandler + 'a,
    {
        self.start(Some(Box::new(handler)), interval_ms)
    }

    /// Start a session without a handler. The window is pumped but its
    /// events are never drained.
    pub fn run_unobserved(&mut self, interval_ms: i64) -> Result<PollSession<'_, E>, BridgeError> {
        self.start(None, interval_ms)
    }

    fn start<'a>(
        &'a mut self,
        handler: Option<Box<dyn EventHandler + 'a>>,
        interval_ms: i64,
    ) -> Result<PollSession<'a, E>, BridgeError> {
        let interval = PollInterval::from_millis(interval_ms)?;
        if self.terminated {
            return Err(EngineError::StaleHandle(self.handle).into());
        }
        Ok(PollSession::new(self, handler, interval))
    }
}
