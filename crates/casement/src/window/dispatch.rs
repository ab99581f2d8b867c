//! The event pump
//!
//! One native event is pulled at a time, classified, folded into the cached
//! state and delivered to observers before the next one is pulled. Nothing
//! that happens while handling one event can stop the pump from handling the
//! next; failures are logged.

use super::geometry::clamp_position;
use super::state::Size;
use super::Window;
use crate::backend::WindowBackend;
use crate::events::native::{classify, Classified, NativeEvent};
use crate::events::Event;

impl<B: WindowBackend> Window<B> {
    /// Run until the window stops running
    pub(crate) fn pump(&mut self) {
        while self.state.running {
            self.drain_commands();
            if !self.state.running {
                break;
            }
            let native = self.platform.backend().wait_event();
            self.dispatch(native);
        }
        log::debug!("Event pump for '{}' stopped", self.state.title);
    }

    /// Classify one native event and handle it
    ///
    /// Events addressed to another window are dropped.
    pub(crate) fn dispatch(&mut self, native: NativeEvent) {
        log::trace!("Native event {:#x}/{}", native.kind, native.window_event);
        if let (Some(target), Some(own)) = (native.window, self.state.handle) {
            if target != own {
                log::debug!("Skipping event for window {}", target.raw());
                return;
            }
        }
        match classify(&native) {
            Classified::Event(event) => self.handle_event(event),
            Classified::Wake => {}
            Classified::Unrecognized { kind, window_event } => {
                log::warn!("Ignoring unrecognized native event {kind:#x}/{window_event}");
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Closed => self.close_from_pump(),
            Event::Quit => {
                self.notify(&Event::Quit);
                self.close_from_pump();
            }
            Event::SizeChanged { width, height } => {
                let size = self.reported_size(width, height);
                self.state.size = size;
                let (width, height) = size.to_native();
                self.notify(&Event::SizeChanged { width, height });
            }
            Event::Moved { x, y } => {
                self.state.position = clamp_position(x, y);
                self.notify(&event);
            }
            Event::Minimized => {
                self.state.mark_minimized();
                self.notify(&event);
            }
            Event::Maximized => {
                self.state.mark_maximized();
                self.notify(&event);
            }
            Event::Restored => {
                self.state.mark_restored();
                self.notify(&event);
            }
            Event::FocusGained | Event::TakeFocus => {
                self.state.focused = true;
                self.notify(&event);
            }
            Event::FocusLost => {
                self.state.focused = false;
                self.notify(&event);
            }
            other => self.notify(&other),
        }
    }

    /// Size the backend reports now; the event payload if it cannot say
    fn reported_size(&self, width: i32, height: i32) -> Size {
        let Some(handle) = self.state.handle else {
            return Size::from_native(width, height);
        };
        match self.platform.backend().window_size(handle) {
            Ok(size) => size,
            Err(err) => {
                log::warn!("Re-reading window size failed, using event payload: {err}");
                Size::from_native(width, height)
            }
        }
    }

    fn close_from_pump(&mut self) {
        if let Err(err) = self.close() {
            log::error!("Closing window from the event pump failed: {err}");
        }
    }
}
