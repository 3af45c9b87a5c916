//! Cooperative poll bridge between a host control loop and a native
//! window engine.
//!
//! The engine side exposes a pull-based, tick-oriented interface
//! ([`WindowEngine`]): advance one step, then drain what happened. The
//! bridge turns that into a push-based stream of [`Event`]s delivered to a
//! caller's [`EventHandler`] on a fixed cadence, until the window closes.
//!
//! ```rust,no_run
//! use webpump_bridge::{ContentSource, PollBridge, ScriptedEngine};
//! use webpump_common::{Event, HandlerError};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = ScriptedEngine::new().closing_step([Event::close()]);
//! let mut bridge = PollBridge::open(engine, &ContentSource::parse("about:blank"))?;
//!
//! let outcome = bridge
//!     .run(
//!         |event: &Event| -> Result<(), HandlerError> {
//!             println!("{}", event.kind);
//!             Ok(())
//!         },
//!         16,
//!     )?
//!     .await?;
//! assert!(outcome.is_completed());
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod engine;
pub mod handler;
pub mod interval;
pub mod scripted;
pub mod session;


pub use bridge::PollBridge;
pub use engine::{ContentSource, WindowEngine};
pub use handler::{ChannelHandler, EventHandler, Guarded};
pub use interval::{PollInterval, DEFAULT_INTERVAL_MS};
pub use scripted::{CallLog, EngineCall, ScriptedEngine};
pub use session::{PollSession, SessionEnd, SessionHandle, SessionOutcome, SessionState};

pub use webpump_common::Event;
