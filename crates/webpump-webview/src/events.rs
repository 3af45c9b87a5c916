//! Buffering of native callbacks into lifecycle events.

use std::sync::{Arc, Mutex};

use tracing::debug;
use webpump_common::Event;

/// Shared queue that native callbacks push into and the engine drains.
///
/// Webview callbacks run inside the event-loop pump on the same thread, but
/// wry requires them to be `'static`, so the queue is shared through an
/// `Arc`.
#[derive(Debug, Clone, Default)]
pub struct EventSink(Arc<Mutex<Vec<Event>>>);

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        debug!(kind = %event.kind, "native event");
        if let Ok(mut events) = self.0.lock() {
            events.push(event);
        }
    }

    /// Take every queued event, oldest first, leaving the queue empty.
    pub fn drain(&self) -> Vec<Event> {
        self.0
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lifecycle event for a page-load notification, if any.
///
/// Only a finished load is reported; navigation starts are not part of the
/// event vocabulary.
pub fn page_load_event(event: &wry::PageLoadEvent) -> Option<Event> {
    match event {
        wry::PageLoadEvent::Finished => Some(Event::content_loaded()),
        wry::PageLoadEvent::Started => None,
    }
}

/// Lifecycle event for a window event, if any.
pub fn window_event(event: &winit::event::WindowEvent) -> Option<Event> {
    match event {
        winit::event::WindowEvent::CloseRequested => Some(Event::close()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webpump_common::EventKind;
    use winit::event::WindowEvent;

    #[test]
    fn drain_returns_in_push_order_and_clears() {
        let sink = EventSink::new();
        sink.push(Event::window_created());
        sink.push(Event::content_loaded());
        sink.push(Event::close());
        assert_eq!(sink.len(), 3);

        let kinds: Vec<_> = sink.drain().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::WindowCreated, EventKind::ContentLoaded, EventKind::Close]
        );
        assert!(sink.is_empty());
        assert!(sink.drain().is_empty());
    }

    #[test]
    fn clones_share_one_queue() {
        let sink = EventSink::new();
        let callback_side = sink.clone();
        callback_side.push(Event::content_loaded());
        assert_eq!(sink.drain(), vec![Event::content_loaded()]);
    }

    #[test]
    fn only_finished_page_load_is_reported() {
        assert_eq!(
            page_load_event(&wry::PageLoadEvent::Finished),
            Some(Event::content_loaded())
        );
        assert_eq!(page_load_event(&wry::PageLoadEvent::Started), None);
    }

    #[test]
    fn close_request_maps_to_close() {
        assert_eq!(window_event(&WindowEvent::CloseRequested), Some(Event::close()));
        assert_eq!(window_event(&WindowEvent::Focused(true)), None);
        assert_eq!(window_event(&WindowEvent::Destroyed), None);
    }
}
