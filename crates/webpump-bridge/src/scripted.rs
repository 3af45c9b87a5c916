//! Deterministic in-memory engine.
//!
//! [`ScriptedEngine`] plays back a fixed list of steps, one per
//! [`advance`](WindowEngine::advance) call, and records every call it
//! receives in a shared [`CallLog`]. It enforces the same handle rules as a
//! real engine, so contract violations show up as errors rather than being
//! silently tolerated.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use webpump_common::{EngineError, Event, WindowHandle};

use crate::engine::{ContentSource, WindowEngine};

/// One call that crossed into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Create(ContentSource),
    Advance(WindowHandle),
    Drain(WindowHandle),
}

/// Shared, cloneable record of engine calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<EngineCall>>>);

impl CallLog {
    fn push(&self, call: EngineCall) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call);
        }
    }

    /// Snapshot of every call so far, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.0.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn advance_count(&self) -> usize {
        self.count(|call| matches!(call, EngineCall::Advance(_)))
    }

    pub fn drain_count(&self) -> usize {
        self.count(|call| matches!(call, EngineCall::Drain(_)))
    }

    fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.0
            .lock()
            .map(|c| c.iter().filter(|call| pred(call)).count())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Unopened,
    Open,
    /// `advance` reported closure; the final events may still be drained.
    Closing,
    Closed,
}

#[derive(Debug, Clone)]
struct Step {
    alive: bool,
    events: Vec<Event>,
}

/// An engine whose behaviour is scripted step by step.
///
/// Once the script runs out the window simply stays open with no new
/// events, like a window nobody is interacting with.
#[derive(Debug)]
pub struct ScriptedEngine {
    steps: VecDeque<Step>,
    handle: Option<WindowHandle>,
    lifecycle: Lifecycle,
    pending: Vec<Event>,
    log: CallLog,
    init_error: Option<String>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            handle: None,
            lifecycle: Lifecycle::Unopened,
            pending: Vec::new(),
            log: CallLog::default(),
            init_error: None,
        }
    }

    /// Append a step: the liveness `advance` reports and the events it records.
    pub fn step(mut self, alive: bool, events: impl IntoIterator<Item = Event>) -> Self {
        self.steps.push_back(Step {
            alive,
            events: events.into_iter().collect(),
        });
        self
    }

    pub fn open_step(self, events: impl IntoIterator<Item = Event>) -> Self {
        self.step(true, events)
    }

    pub fn closing_step(self, events: impl IntoIterator<Item = Event>) -> Self {
        self.step(false, events)
    }

    /// Make `create` fail as if no display were available.
    pub fn failing_init(mut self, reason: impl Into<String>) -> Self {
        self.init_error = Some(reason.into());
        self
    }

    pub fn call_log(&self) -> CallLog {
        self.log.clone()
    }

    pub fn remaining_steps(&self) -> usize {
        self.steps.len()
    }

    fn check_handle(&self, handle: WindowHandle) -> Result<(), EngineError> {
        match self.handle {
            Some(own) if own == handle => Ok(()),
            _ => Err(EngineError::UnknownHandle(handle)),
        }
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowEngine for ScriptedEngine {
    fn create(&mut self, source: &ContentSource) -> Result<WindowHandle, EngineError> {
        self.log.push(EngineCall::Create(source.clone()));

        if let Some(reason) = &self.init_error {
            return Err(EngineError::Init(reason.clone()));
        }
        if self.handle.is_some() {
            return Err(EngineError::Init("engine already owns a window".into()));
        }

        let handle = WindowHandle::next();
        self.handle = Some(handle);
        self.lifecycle = Lifecycle::Open;
        Ok(handle)
    }

    fn advance(&mut self, handle: WindowHandle) -> Result<bool, EngineError> {
        self.log.push(EngineCall::Advance(handle));
        self.check_handle(handle)?;

        match self.lifecycle {
            Lifecycle::Closing | Lifecycle::Closed => Err(EngineError::StaleHandle(handle)),
            Lifecycle::Unopened => Err(EngineError::UnknownHandle(handle)),
            Lifecycle::Open => {
                let Some(step) = self.steps.pop_front() else {
                    return Ok(true);
                };
                self.pending.extend(step.events);
                if !step.alive {
                    self.lifecycle = Lifecycle::Closing;
                }
                Ok(step.alive)
            }
        }
    }

    fn drain_events(&mut self, handle: WindowHandle) -> Result<Vec<Event>, EngineError> {
        self.log.push(EngineCall::Drain(handle));
        self.check_handle(handle)?;

        match self.lifecycle {
            Lifecycle::Closed => Err(EngineError::StaleHandle(handle)),
            Lifecycle::Unopened => Err(EngineError::UnknownHandle(handle)),
            Lifecycle::Closing => {
                self.lifecycle = Lifecycle::Closed;
                Ok(std::mem::take(&mut self.pending))
            }
            Lifecycle::Open => Ok(std::mem::take(&mut self.pending)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> ContentSource {
        ContentSource::parse("about:blank")
    }

    #[test]
    fn plays_back_steps_in_order() {
        let mut engine = ScriptedEngine::new()
            .open_step([Event::window_created()])
            .closing_step([Event::close()]);
        let handle = engine.create(&source()).unwrap();

        assert!(engine.advance(handle).unwrap());
        assert_eq!(engine.drain_events(handle).unwrap(), vec![Event::window_created()]);
        assert!(!engine.advance(handle).unwrap());
        assert_eq!(engine.drain_events(handle).unwrap(), vec![Event::close()]);
        assert_eq!(engine.remaining_steps(), 0);
    }

    #[test]
    fn events_accumulate_until_drained() {
        let mut engine = ScriptedEngine::new()
            .open_step([Event::window_created()])
            .open_step([Event::content_loaded()]);
        let handle = engine.create(&source()).unwrap();

        engine.advance(handle).unwrap();
        engine.advance(handle).unwrap();
        assert_eq!(
            engine.drain_events(handle).unwrap(),
            vec![Event::window_created(), Event::content_loaded()]
        );
        assert!(engine.drain_events(handle).unwrap().is_empty());
    }

    #[test]
    fn stays_open_after_script_ends() {
        let mut engine = ScriptedEngine::new();
        let handle = engine.create(&source()).unwrap();
        for _ in 0..10 {
            assert!(engine.advance(handle).unwrap());
        }
    }

    #[test]
    fn advance_after_close_is_stale() {
        let mut engine = ScriptedEngine::new().closing_step([]);
        let handle = engine.create(&source()).unwrap();

        assert!(!engine.advance(handle).unwrap());
        assert!(matches!(
            engine.advance(handle),
            Err(EngineError::StaleHandle(h)) if h == handle
        ));
    }

    #[test]
    fn final_drain_allowed_once() {
        let mut engine = ScriptedEngine::new().closing_step([Event::close()]);
        let handle = engine.create(&source()).unwrap();

        engine.advance(handle).unwrap();
        assert_eq!(engine.drain_events(handle).unwrap(), vec![Event::close()]);
        assert!(matches!(
            engine.drain_events(handle),
            Err(EngineError::StaleHandle(_))
        ));
    }

    #[test]
    fn foreign_handle_is_unknown() {
        let mut engine = ScriptedEngine::new();
        engine.create(&source()).unwrap();
        let other = WindowHandle::next();
        assert!(matches!(
            engine.advance(other),
            Err(EngineError::UnknownHandle(h)) if h == other
        ));
    }

    #[test]
    fn failing_init_reports_init_error() {
        let mut engine = ScriptedEngine::new().failing_init("no display");
        let err = engine.create(&source()).unwrap_err();
        assert!(matches!(err, EngineError::Init(ref reason) if reason == "no display"));
    }

    #[test]
    fn second_create_is_rejected() {
        let mut engine = ScriptedEngine::new();
        engine.create(&source()).unwrap();
        assert!(matches!(engine.create(&source()), Err(EngineError::Init(_))));
    }

    #[test]
    fn call_log_records_everything() {
        let mut engine = ScriptedEngine::new();
        let log = engine.call_log();
        let handle = engine.create(&source()).unwrap();
        engine.advance(handle).unwrap();
        engine.drain_events(handle).unwrap();

        assert_eq!(
            log.calls(),
            vec![
                EngineCall::Create(source()),
                EngineCall::Advance(handle),
                EngineCall::Drain(handle),
            ]
        );
        assert_eq!(log.advance_count(), 1);
        assert_eq!(log.drain_count(), 1);
    }
}
