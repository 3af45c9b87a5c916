//! A single run of the poll loop.
//!
//! A [`PollSession`] does nothing until it is awaited. Awaiting it drives a
//! fixed-cadence tick on the current task:
//!
//! 1. `advance` the engine and remember the reported liveness,
//! 2. when a handler is registered, drain the engine and hand each event to
//!    it in drain order,
//! 3. when liveness was `false`, stop and resolve.
//!
//! Suspension only happens between ticks. The timer is re-armed with
//! [`MissedTickBehavior::Delay`], so a slow handler pushes the next tick back
//! instead of causing a burst of catch-up ticks.

use std::future::{Future, IntoFuture};
use std::pin::Pin;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use webpump_common::{BridgeError, EngineError};

use crate::bridge::PollBridge;
use crate::engine::WindowEngine;
use crate::handler::EventHandler;
use crate::interval::PollInterval;

/// Lifecycle of a poll session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not yet awaited.
    Idle,
    Running,
    /// The engine reported that the window closed.
    Completed,
    /// Stopped through [`SessionHandle::cancel`].
    Cancelled,
    /// Stopped by a handler or engine error.
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Why a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Completed,
    Cancelled,
}

/// Result of a session that ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub end: SessionEnd,
    /// Ticks executed, including the terminal one.
    pub ticks: u64,
    /// Events handed to the handler.
    pub events_dispatched: u64,
}

impl SessionOutcome {
    pub fn is_completed(&self) -> bool {
        self.end == SessionEnd::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.end == SessionEnd::Cancelled
    }
}

/// Cloneable remote control for a session: observe its state or cancel it.
///
/// The handle is `Send`, so it can be moved to another task or thread even
/// though the session itself runs on the task that awaits it.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    token: CancellationToken,
    state: watch::Receiver<SessionState>,
}

impl SessionHandle {
    /// Stop the session before its next tick.
    ///
    /// No event is synthesized; the session resolves as
    /// [`SessionEnd::Cancelled`]. Cancelling a finished session does nothing.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Wait until the session reaches a terminal state.
    ///
    /// Returns [`SessionState::Idle`] if the session was dropped without
    /// ever being awaited.
    pub async fn finished(&mut self) -> SessionState {
        let reached = self.state.wait_for(|s| s.is_terminal()).await.map(|s| *s);
        reached.unwrap_or_else(|_| *self.state.borrow())
    }
}

/// One run of the poll loop over a bridge's window.
#[must_use = "a poll session does nothing unless awaited"]
pub struct PollSession<'a, E: WindowEngine> {
    bridge: &'a mut PollBridge<E>,
    handler: Option<Box<dyn EventHandler + 'a>>,
    interval: PollInterval,
    token: CancellationToken,
    state: watch::Sender<SessionState>,
    ticks: u64,
    dispatched: u64,
}

impl<'a, E: WindowEngine> PollSession<'a, E> {
    pub(crate) fn new(
        bridge: &'a mut PollBridge<E>,
        handler: Option<Box<dyn EventHandler + 'a>>,
        interval: PollInterval,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            bridge,
            handler,
            interval,
            token: CancellationToken::new(),
            state,
            ticks: 0,
            dispatched: 0,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            token: self.token.clone(),
            state: self.state.subscribe(),
        }
    }

    pub fn interval(&self) -> PollInterval {
        self.interval
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    fn set_state(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    fn outcome(&self, end: SessionEnd) -> SessionOutcome {
        SessionOutcome {
            end,
            ticks: self.ticks,
            events_dispatched: self.dispatched,
        }
    }

    async fn drive(mut self) -> Result<SessionOutcome, BridgeError> {
        let handle = self.bridge.handle();
        let period = self.interval.as_duration();

        // First tick fires one full period after start, like a repeating timer.
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.set_state(SessionState::Running);
        info!(
            %handle,
            interval_ms = self.interval.as_millis() as u64,
            observed = self.handler.is_some(),
            "poll session started"
        );

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => {
                    self.set_state(SessionState::Cancelled);
                    info!(%handle, ticks = self.ticks, "poll session cancelled");
                    return Ok(self.outcome(SessionEnd::Cancelled));
                }
                _ = ticker.tick() => {}
            }

            match self.tick() {
                Ok(true) => {}
                Ok(false) => {
                    self.set_state(SessionState::Completed);
                    info!(
                        %handle,
                        ticks = self.ticks,
                        events = self.dispatched,
                        "window closed, poll session completed"
                    );
                    return Ok(self.outcome(SessionEnd::Completed));
                }
                Err(e) => {
                    self.set_state(SessionState::Failed);
                    warn!(%handle, ticks = self.ticks, error = %e, "poll session failed");
                    return Err(e);
                }
            }
        }
    }

    /// Run one tick. Returns the liveness reported by the engine.
    fn tick(&mut self) -> Result<bool, BridgeError> {
        self.ticks += 1;
        let handle = self.bridge.handle();

        let alive = match self.bridge.engine.advance(handle) {
            Ok(alive) => alive,
            Err(e) => {
                if matches!(e, EngineError::StaleHandle(_)) {
                    self.bridge.terminated = true;
                }
                return Err(e.into());
            }
        };
        if !alive {
            self.bridge.terminated = true;
        }

        if let Some(handler) = self.handler.as_mut() {
            let events = self.bridge.engine.drain_events(handle)?;
            if !events.is_empty() {
                debug!(%handle, tick = self.ticks, count = events.len(), "dispatching events");
            }
            for event in &events {
                trace!(%handle, kind = %event.kind, "event");
                handler.on_event(event)?;
                self.dispatched += 1;
            }
        }

        Ok(alive)
    }
}

impl<'a, E: WindowEngine + 'a> IntoFuture for PollSession<'a, E> {
    type Output = Result<SessionOutcome, BridgeError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.drive())
    }
}
