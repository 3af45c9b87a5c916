//! [`WindowEngine`] implementation on winit + wry.
//!
//! The event loop is never handed over to winit. Each `advance` pumps it with
//! a zero timeout, which dispatches whatever the OS has queued and returns
//! immediately. Lifecycle events are collected in an [`EventSink`] until the
//! bridge drains them.
//!
//! winit allows a single event loop per process, so one `WebViewEngine`
//! (and therefore one window) per process is supported.

mod target;
mod window;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use winit::event_loop::EventLoop;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};

use webpump_bridge::{ContentSource, WindowEngine};
use webpump_common::{EngineError, Event, WindowHandle};
use webpump_config::WindowConfig;

use crate::bundle::EmbeddedAssets;
use crate::content::ContentProvider;
use crate::events::EventSink;

use self::target::LoadTarget;
use self::window::NativeWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Unopened,
    Open,
    /// Closed, with the final events not yet drained.
    Closing,
    Closed,
}

/// A single native window with an embedded webview.
pub struct WebViewEngine {
    config: WindowConfig,
    // Dropped before the event loop.
    window: Option<NativeWindow>,
    event_loop: Option<EventLoop<()>>,
    handle: Option<WindowHandle>,
    sink: EventSink,
    lifecycle: Lifecycle,
    /// Serves local paths when running as a standalone.
    embedded: Option<Arc<ContentProvider>>,
}

impl WebViewEngine {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            window: None,
            event_loop: None,
            handle: None,
            sink: EventSink::new(),
            lifecycle: Lifecycle::Unopened,
            embedded: None,
        }
    }

    /// Engine whose local-path sources are answered from `assets` rather
    /// than the filesystem.
    pub fn with_assets(config: WindowConfig, assets: EmbeddedAssets) -> Self {
        Self {
            embedded: Some(Arc::new(ContentProvider::embedded(assets))),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Dispatch everything the OS has queued without waiting.
    ///
    /// Returns whether the window is still open afterwards.
    fn pump(&mut self) -> bool {
        let (Some(event_loop), Some(window)) = (self.event_loop.as_mut(), self.window.as_mut())
        else {
            return false;
        };

        let status = event_loop.pump_app_events(Some(Duration::ZERO), window);

        // wry drives WebKitGTK through the GTK main context, which winit
        // does not pump.
        #[cfg(target_os = "linux")]
        while gtk::events_pending() {
            gtk::main_iteration_do(false);
        }

        matches!(status, PumpStatus::Continue) && window.is_open()
    }

    fn check_handle(&self, handle: WindowHandle) -> Result<(), EngineError> {
        match self.handle {
            Some(own) if own == handle => Ok(()),
            _ => Err(EngineError::UnknownHandle(handle)),
        }
    }
}

impl WindowEngine for WebViewEngine {
    fn create(&mut self, source: &ContentSource) -> Result<WindowHandle, EngineError> {
        if self.handle.is_some() {
            return Err(EngineError::Init("engine already owns a window".into()));
        }

        let target = LoadTarget::resolve(source, self.embedded.as_ref())?;
        let event_loop = EventLoop::new()
            .map_err(|e| EngineError::Init(format!("failed to create event loop: {e}")))?;

        #[cfg(target_os = "linux")]
        gtk::init().map_err(|e| EngineError::Init(format!("failed to initialize gtk: {e}")))?;

        self.event_loop = Some(event_loop);
        self.window = Some(NativeWindow::new(
            self.config.clone(),
            target,
            self.sink.clone(),
        ));

        // The first pump delivers `resumed`, which builds the window.
        let open = self.pump();
        let init_error = self.window.as_mut().and_then(NativeWindow::take_init_error);
        if let Some(reason) = init_error {
            self.window = None;
            return Err(EngineError::Init(reason));
        }
        if !open {
            self.window = None;
            return Err(EngineError::Init("window was not created on startup".into()));
        }

        let handle = WindowHandle::next();
        self.handle = Some(handle);
        self.lifecycle = Lifecycle::Open;
        info!(%handle, %source, "native window opened");
        Ok(handle)
    }

    fn advance(&mut self, handle: WindowHandle) -> Result<bool, EngineError> {
        self.check_handle(handle)?;
        match self.lifecycle {
            Lifecycle::Closing | Lifecycle::Closed => return Err(EngineError::StaleHandle(handle)),
            Lifecycle::Unopened => return Err(EngineError::UnknownHandle(handle)),
            Lifecycle::Open => {}
        }

        let alive = self.pump();
        if !alive {
            debug!(%handle, pending = self.sink.len(), "native window closed");
            self.lifecycle = Lifecycle::Closing;
            self.window = None;
        }
        Ok(alive)
    }

    fn drain_events(&mut self, handle: WindowHandle) -> Result<Vec<Event>, EngineError> {
        self.check_handle(handle)?;
        match self.lifecycle {
            Lifecycle::Closed => Err(EngineError::StaleHandle(handle)),
            Lifecycle::Unopened => Err(EngineError::UnknownHandle(handle)),
            Lifecycle::Closing => {
                self.lifecycle = Lifecycle::Closed;
                Ok(self.sink.drain())
            }
            Lifecycle::Open => Ok(self.sink.drain()),
        }
    }
}
