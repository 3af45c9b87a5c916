use tracing::{debug, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};
use wry::{WebView, WebViewBuilder};

use webpump_common::Event;
use webpump_config::WindowConfig;

use crate::content::PROTOCOL;
use crate::events::{self, EventSink};

use super::target::LoadTarget;

/// The native window and its webview, driven by winit callbacks.
pub(crate) struct NativeWindow {
    config: WindowConfig,
    target: LoadTarget,
    sink: EventSink,
    // Field order matters: the webview must drop before its window.
    webview: Option<WebView>,
    window: Option<Window>,
    init_error: Option<String>,
    closed: bool,
}

impl NativeWindow {
    pub(crate) fn new(config: WindowConfig, target: LoadTarget, sink: EventSink) -> Self {
        Self {
            config,
            target,
            sink,
            webview: None,
            window: None,
            init_error: None,
            closed: false,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.window.is_some() && !self.closed
    }

    pub(crate) fn take_init_error(&mut self) -> Option<String> {
        self.init_error.take()
    }

    fn build(&mut self, event_loop: &ActiveEventLoop) -> Result<(), String> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.as_str())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height))
            .with_resizable(self.config.resizable)
            .with_transparent(self.config.transparent);
        let window = event_loop
            .create_window(attrs)
            .map_err(|e| format!("failed to create window: {e}"))?;

        let webview = self
            .webview_builder()
            .build(&window)
            .map_err(|e| format!("failed to create webview: {e}"))?;

        self.window = Some(window);
        self.webview = Some(webview);
        Ok(())
    }

    fn webview_builder(&self) -> WebViewBuilder<'static> {
        let url = self.target.url();
        let mut builder = WebViewBuilder::new()
            .with_transparent(self.config.transparent)
            .with_devtools(self.config.devtools);

        let sink = self.sink.clone();
        builder = builder.with_on_page_load_handler(move |event, url| {
            debug!(?event, url = %url, "page load");
            if let Some(event) = events::page_load_event(&event) {
                sink.push(event);
            }
        });

        if let Some(provider) = self.target.provider() {
            builder = builder.with_custom_protocol(PROTOCOL.to_string(), move |_id, request| {
                provider.serve(&request.uri().to_string())
            });
        }

        debug!(url = %url, "loading content");
        builder.with_url(url)
    }

    fn destroy(&mut self) {
        self.webview = None;
        self.window = None;
        self.closed = true;
    }
}

impl ApplicationHandler for NativeWindow {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.closed || self.init_error.is_some() {
            return;
        }

        match self.build(event_loop) {
            Ok(()) => {
                info!(title = %self.config.title, "window created");
                self.sink.push(Event::window_created());
            }
            Err(reason) => {
                warn!(error = %reason, "window initialization failed");
                self.init_error = Some(reason);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(lifecycle) = events::window_event(&event) {
            self.sink.push(lifecycle);
        }

        match event {
            WindowEvent::CloseRequested => {
                debug!("close requested, destroying window");
                self.destroy();
                event_loop.exit();
            }
            WindowEvent::Destroyed => {
                self.closed = true;
            }
            _ => {}
        }
    }
}
