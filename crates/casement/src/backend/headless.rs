//! In-memory backend with a scripted event queue
//!
//! Windows live in a slot map and never touch the display. Events come from
//! an [`EventScript`] that tests (or other threads) fill in advance. Like a
//! real windowing system, state changes made through the backend are echoed
//! back as window events at the end of the queue.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use slotmap::{new_key_type, Key, KeyData, SlotMap};

use super::{
    GlSettings, IconHandle, NativeHandle, VSync, Wake, WindowBackend, WindowDescriptor,
    WindowFlags,
};
use crate::error::BackendError;
use crate::events::native::{kind, window_event, NativeEvent};
use crate::icon::IconImage;
use crate::window::{Position, Size, WindowMode};

new_key_type! {
    struct WindowKey;
    struct IconKey;
}

/// Snapshot of what an in-memory window currently looks like
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWindow {
    /// Title
    pub title: String,
    /// Client size
    pub size: Size,
    /// Minimum size limit
    pub min_size: Size,
    /// Maximum size limit
    pub max_size: Size,
    /// Position
    pub position: Position,
    /// Opacity
    pub opacity: f32,
    /// Resizable flag
    pub resizable: bool,
    /// Native display mode
    pub mode: WindowMode,
    /// Assigned icon
    pub icon: Option<IconHandle>,
    /// Whether the window is shown
    pub visible: bool,
    /// Minimized flag
    pub minimized: bool,
    /// Maximized flag
    pub maximized: bool,
    /// Focus flag
    pub focused: bool,
    /// OpenGL context attributes, if the window has a context
    pub gl: Option<GlSettings>,
    /// Swap interval last applied to the context
    pub vsync: VSync,
    /// Buffer swaps presented so far
    pub frames_presented: u64,
}

#[derive(Default)]
struct ScriptQueue {
    events: Mutex<VecDeque<NativeEvent>>,
    ready: Condvar,
}

impl ScriptQueue {
    fn lock(&self) -> MutexGuard<'_, VecDeque<NativeEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: NativeEvent) {
        self.lock().push_back(event);
        self.ready.notify_one();
    }
}

/// Shared, thread-safe handle to a headless backend's event queue
#[derive(Clone, Default)]
pub struct EventScript {
    queue: Arc<ScriptQueue>,
}

impl EventScript {
    /// Append an event
    pub fn push(&self, event: NativeEvent) {
        self.queue.push(event);
    }

    /// Append several events in order
    pub fn extend(&self, events: impl IntoIterator<Item = NativeEvent>) {
        self.queue.lock().extend(events);
        self.queue.ready.notify_one();
    }

    /// Number of events not yet delivered
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Whether every event has been delivered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct ScriptWaker(Arc<ScriptQueue>);

impl Wake for ScriptWaker {
    fn wake(&self) {
        self.0.push(NativeEvent::new(kind::USER));
    }
}

/// Counters shared with the backend, readable after it has been dropped
#[derive(Debug, Default)]
pub struct HeadlessStats {
    windows_created: AtomicUsize,
    windows_destroyed: AtomicUsize,
    icons_created: AtomicUsize,
    icons_destroyed: AtomicUsize,
    shutdowns: AtomicUsize,
}

impl HeadlessStats {
    /// Windows created so far
    pub fn windows_created(&self) -> usize {
        self.windows_created.load(Ordering::SeqCst)
    }

    /// Windows destroyed so far
    pub fn windows_destroyed(&self) -> usize {
        self.windows_destroyed.load(Ordering::SeqCst)
    }

    /// Icons created so far
    pub fn icons_created(&self) -> usize {
        self.icons_created.load(Ordering::SeqCst)
    }

    /// Icons destroyed so far
    pub fn icons_destroyed(&self) -> usize {
        self.icons_destroyed.load(Ordering::SeqCst)
    }

    /// Times [`WindowBackend::shutdown`] ran
    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

/// Backend that keeps windows in memory and replays scripted events
pub struct HeadlessBackend {
    windows: SlotMap<WindowKey, HeadlessWindow>,
    icons: SlotMap<IconKey, IconImage>,
    script: EventScript,
    stats: Arc<HeadlessStats>,
    desktop: Size,
    blocking: bool,
    echo: bool,
    fail_desktop_query: bool,
    fail_fullscreen: bool,
}

impl HeadlessBackend {
    /// Create a backend with a 1920x1080 desktop
    ///
    /// Once the script runs dry, [`WindowBackend::wait_event`] reports a quit
    /// so a pump driven by this backend always terminates.
    pub fn new() -> Self {
        Self {
            windows: SlotMap::with_key(),
            icons: SlotMap::with_key(),
            script: EventScript::default(),
            stats: Arc::new(HeadlessStats::default()),
            desktop: Size::new(1920, 1080),
            blocking: false,
            echo: true,
            fail_desktop_query: false,
            fail_fullscreen: false,
        }
    }

    /// Block on an empty script instead of reporting a quit
    pub fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }

    /// Do not echo state changes back as events
    pub fn without_echo(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Use a different desktop resolution
    pub fn with_desktop(mut self, desktop: Size) -> Self {
        self.desktop = desktop;
        self
    }

    /// Make every desktop resolution query fail
    pub fn failing_desktop_query(mut self) -> Self {
        self.fail_desktop_query = true;
        self
    }

    /// Make every non-windowed `set_fullscreen` call fail
    pub fn failing_fullscreen(mut self) -> Self {
        self.fail_fullscreen = true;
        self
    }

    /// Handle for feeding events, usable from any thread
    pub fn script(&self) -> EventScript {
        self.script.clone()
    }

    /// Shared counters
    pub fn stats(&self) -> Arc<HeadlessStats> {
        Arc::clone(&self.stats)
    }

    /// Current state of a window, if it exists
    pub fn window(&self, window: NativeHandle) -> Option<&HeadlessWindow> {
        self.windows.get(window_key(window))
    }

    /// Number of live windows
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Number of live icons
    pub fn icon_count(&self) -> usize {
        self.icons.len()
    }

    fn echo(&self, window: NativeHandle, sub_event: u8, data1: i32, data2: i32) {
        if self.echo {
            self.script
                .push(NativeEvent::window(sub_event, data1, data2).for_window(window));
        }
    }

    fn gl_mut(
        &mut self,
        operation: &'static str,
        window: NativeHandle,
    ) -> Result<&mut HeadlessWindow, BackendError> {
        let w = self
            .windows
            .get_mut(window_key(window))
            .ok_or_else(|| missing(operation, window))?;
        if w.gl.is_none() {
            return Err(BackendError::new(operation, "window has no OpenGL context"));
        }
        Ok(w)
    }

    fn get_mut(&mut self, window: NativeHandle) -> Option<&mut HeadlessWindow> {
        let found = self.windows.get_mut(window_key(window));
        if found.is_none() {
            log::warn!("Headless backend: unknown window {}", window.raw());
        }
        found
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn window_key(window: NativeHandle) -> WindowKey {
    KeyData::from_ffi(window.raw()).into()
}

fn icon_key(icon: IconHandle) -> IconKey {
    KeyData::from_ffi(icon.raw()).into()
}

fn missing(operation: &'static str, window: NativeHandle) -> BackendError {
    BackendError::new(operation, format!("invalid window {}", window.raw()))
}

fn clamp_to(size: Size, min: Size, max: Size) -> Size {
    Size::new(
        size.width.clamp(min.width, max.width.max(min.width)),
        size.height.clamp(min.height, max.height.max(min.height)),
    )
}

impl WindowBackend for HeadlessBackend {
    fn create_window(
        &mut self,
        descriptor: &WindowDescriptor,
    ) -> Result<NativeHandle, BackendError> {
        let flags = descriptor.flags;
        let key = self.windows.insert(HeadlessWindow {
            title: descriptor.title.clone(),
            size: descriptor.size,
            min_size: Size::MIN,
            max_size: Size::MAX,
            position: descriptor.position.unwrap_or_default(),
            opacity: 1.0,
            resizable: flags.contains(WindowFlags::RESIZABLE),
            mode: WindowMode::Windowed,
            icon: None,
            visible: !flags.contains(WindowFlags::HIDDEN),
            minimized: false,
            maximized: false,
            focused: false,
            gl: descriptor.gl,
            vsync: descriptor.gl.map_or(VSync::Unknown, |gl| gl.vsync),
            frames_presented: 0,
        });
        self.stats.windows_created.fetch_add(1, Ordering::SeqCst);

        NativeHandle::from_raw(key.data().as_ffi()).ok_or_else(|| {
            self.windows.remove(key);
            BackendError::new("create_window", "slot map produced a null key")
        })
    }

    fn destroy_window(&mut self, window: NativeHandle) {
        if self.windows.remove(window_key(window)).is_some() {
            self.stats.windows_destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn window_size(&self, window: NativeHandle) -> Result<Size, BackendError> {
        self.window(window)
            .map(|w| w.size)
            .ok_or_else(|| missing("window_size", window))
    }

    fn set_window_size(&mut self, window: NativeHandle, size: Size) {
        let Some(w) = self.get_mut(window) else { return };
        let size = clamp_to(size, w.min_size, w.max_size);
        if w.size != size {
            w.size = size;
            let (width, height) = size.to_native();
            self.echo(window, window_event::SIZE_CHANGED, width, height);
        }
    }

    fn set_size_limits(&mut self, window: NativeHandle, min: Size, max: Size) {
        let Some(w) = self.get_mut(window) else { return };
        w.min_size = min;
        w.max_size = max;
        let size = clamp_to(w.size, min, max);
        if w.size != size {
            w.size = size;
            let (width, height) = size.to_native();
            self.echo(window, window_event::SIZE_CHANGED, width, height);
        }
    }

    fn window_position(&self, window: NativeHandle) -> Result<Position, BackendError> {
        self.window(window)
            .map(|w| w.position)
            .ok_or_else(|| missing("window_position", window))
    }

    fn set_window_position(&mut self, window: NativeHandle, position: Position) {
        let Some(w) = self.get_mut(window) else { return };
        if w.position != position {
            w.position = position;
            self.echo(window, window_event::MOVED, position.x, position.y);
        }
    }

    fn set_opacity(&mut self, window: NativeHandle, opacity: f32) -> Result<(), BackendError> {
        let w = self
            .get_mut(window)
            .ok_or_else(|| missing("set_opacity", window))?;
        w.opacity = opacity;
        Ok(())
    }

    fn set_resizable(&mut self, window: NativeHandle, resizable: bool) {
        if let Some(w) = self.get_mut(window) {
            w.resizable = resizable;
        }
    }

    fn set_fullscreen(&mut self, window: NativeHandle, mode: WindowMode) -> Result<(), BackendError> {
        if self.fail_fullscreen && mode.covers_desktop() {
            return Err(BackendError::new(
                "set_fullscreen",
                "display does not support the requested mode",
            ));
        }
        let w = self
            .get_mut(window)
            .ok_or_else(|| missing("set_fullscreen", window))?;
        w.mode = mode;
        Ok(())
    }

    fn set_title(&mut self, window: NativeHandle, title: &str) {
        if let Some(w) = self.get_mut(window) {
            w.title = title.to_string();
        }
    }

    fn create_icon(&mut self, image: &IconImage) -> Result<IconHandle, BackendError> {
        let key = self.icons.insert(image.clone());
        self.stats.icons_created.fetch_add(1, Ordering::SeqCst);
        IconHandle::from_raw(key.data().as_ffi()).ok_or_else(|| {
            self.icons.remove(key);
            BackendError::new("create_icon", "slot map produced a null key")
        })
    }

    fn set_window_icon(&mut self, window: NativeHandle, icon: IconHandle) {
        if let Some(w) = self.get_mut(window) {
            w.icon = Some(icon);
        }
    }

    fn destroy_icon(&mut self, icon: IconHandle) {
        if self.icons.remove(icon_key(icon)).is_some() {
            self.stats.icons_destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn minimize(&mut self, window: NativeHandle) {
        let Some(w) = self.get_mut(window) else { return };
        if !w.minimized {
            w.minimized = true;
            w.maximized = false;
            self.echo(window, window_event::MINIMIZED, 0, 0);
        }
    }

    fn maximize(&mut self, window: NativeHandle) {
        let Some(w) = self.get_mut(window) else { return };
        if !w.maximized {
            w.maximized = true;
            w.minimized = false;
            self.echo(window, window_event::MAXIMIZED, 0, 0);
        }
    }

    fn restore(&mut self, window: NativeHandle) {
        let Some(w) = self.get_mut(window) else { return };
        if w.minimized || w.maximized {
            w.minimized = false;
            w.maximized = false;
            self.echo(window, window_event::RESTORED, 0, 0);
        }
    }

    fn raise(&mut self, window: NativeHandle) {
        let Some(w) = self.get_mut(window) else { return };
        w.visible = true;
        if !w.focused {
            w.focused = true;
            self.echo(window, window_event::FOCUS_GAINED, 0, 0);
        }
    }

    fn set_swap_interval(&mut self, window: NativeHandle, vsync: VSync) -> Result<(), BackendError> {
        self.gl_mut("set_swap_interval", window)?.vsync = vsync;
        Ok(())
    }

    fn swap_buffers(&mut self, window: NativeHandle) -> Result<(), BackendError> {
        self.gl_mut("swap_buffers", window)?.frames_presented += 1;
        Ok(())
    }

    fn drawable_size(&self, window: NativeHandle) -> Result<Size, BackendError> {
        self.window_size(window)
    }

    fn desktop_resolution(&mut self) -> Result<Size, BackendError> {
        if self.fail_desktop_query {
            return Err(BackendError::new(
                "desktop_resolution",
                "no video mode for display 0",
            ));
        }
        Ok(self.desktop)
    }

    fn wait_event(&mut self) -> NativeEvent {
        let queue = &self.script.queue;
        let mut events = queue.lock();
        loop {
            if let Some(event) = events.pop_front() {
                log::trace!("Headless event {:#x}/{}", event.kind, event.window_event);
                return event;
            }
            if !self.blocking {
                log::debug!("Headless script exhausted, reporting quit");
                return NativeEvent::new(kind::QUIT);
            }
            events = queue
                .ready
                .wait(events)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn waker(&self) -> Arc<dyn Wake> {
        Arc::new(ScriptWaker(Arc::clone(&self.script.queue)))
    }

    fn shutdown(&mut self) {
        self.stats.shutdowns.fetch_add(1, Ordering::SeqCst);
        log::debug!(
            "Headless backend shut down with {} windows and {} icons alive",
            self.windows.len(),
            self.icons.len()
        );
        self.windows.clear();
        self.icons.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::native::{classify, Classified};
    use crate::events::Event;

    fn descriptor(flags: WindowFlags) -> WindowDescriptor {
        WindowDescriptor {
            title: "headless".to_string(),
            size: Size::new(640, 480),
            position: Some(Position::new(5, 6)),
            flags,
            gl: flags.contains(WindowFlags::OPENGL).then(GlSettings::default),
        }
    }

    fn next(backend: &mut HeadlessBackend) -> Classified {
        classify(&backend.wait_event())
    }

    #[test]
    fn windows_get_distinct_handles_and_are_destroyed_once() {
        let mut backend = HeadlessBackend::new();
        let stats = backend.stats();
        let a = backend.create_window(&descriptor(WindowFlags::RESIZABLE)).unwrap();
        let b = backend.create_window(&descriptor(WindowFlags::HIDDEN)).unwrap();
        assert_ne!(a, b);
        assert!(backend.window(a).unwrap().resizable);
        assert!(!backend.window(b).unwrap().visible);

        backend.destroy_window(a);
        backend.destroy_window(a);
        assert_eq!(stats.windows_destroyed(), 1);
        assert!(backend.window_size(a).is_err());
        assert_eq!(backend.window_count(), 1);
    }

    #[test]
    fn state_changes_are_echoed_in_order() {
        let mut backend = HeadlessBackend::new();
        let window = backend.create_window(&descriptor(WindowFlags::empty())).unwrap();

        backend.set_window_size(window, Size::new(300, 200));
        backend.set_window_size(window, Size::new(300, 200));
        backend.set_window_position(window, Position::new(1, 2));
        backend.minimize(window);
        backend.restore(window);

        assert_eq!(
            next(&mut backend),
            Classified::Event(Event::SizeChanged {
                width: 300,
                height: 200
            })
        );
        assert_eq!(next(&mut backend), Classified::Event(Event::Moved { x: 1, y: 2 }));
        assert_eq!(next(&mut backend), Classified::Event(Event::Minimized));
        assert_eq!(next(&mut backend), Classified::Event(Event::Restored));
        assert_eq!(next(&mut backend), Classified::Event(Event::Quit));
    }

    #[test]
    fn echoed_events_name_their_window() {
        let mut backend = HeadlessBackend::new();
        let window = backend.create_window(&descriptor(WindowFlags::empty())).unwrap();
        backend.maximize(window);
        assert_eq!(backend.wait_event().window, Some(window));
    }

    #[test]
    fn gl_calls_need_a_context() {
        let mut backend = HeadlessBackend::new();
        let plain = backend.create_window(&descriptor(WindowFlags::empty())).unwrap();
        let gl = backend.create_window(&descriptor(WindowFlags::OPENGL)).unwrap();

        assert!(backend.swap_buffers(plain).is_err());
        assert!(backend.set_swap_interval(plain, VSync::Disabled).is_err());

        assert_eq!(backend.window(gl).unwrap().vsync, VSync::Enabled);
        backend.set_swap_interval(gl, VSync::Disabled).unwrap();
        backend.swap_buffers(gl).unwrap();
        backend.swap_buffers(gl).unwrap();
        let state = backend.window(gl).unwrap();
        assert_eq!(state.vsync, VSync::Disabled);
        assert_eq!(state.frames_presented, 2);
        assert_eq!(backend.drawable_size(gl).unwrap(), Size::new(640, 480));
    }

    #[test]
    fn size_limits_clamp_the_native_size() {
        let mut backend = HeadlessBackend::new().without_echo();
        let window = backend.create_window(&descriptor(WindowFlags::empty())).unwrap();
        backend.set_size_limits(window, Size::MIN, Size::new(100, 100));
        assert_eq!(backend.window_size(window).unwrap(), Size::new(100, 100));
        assert!(backend.script().is_empty());
    }

    #[test]
    fn injected_failures_carry_backend_text() {
        let mut backend = HeadlessBackend::new()
            .failing_desktop_query()
            .failing_fullscreen();
        let window = backend.create_window(&descriptor(WindowFlags::empty())).unwrap();

        let err = backend.desktop_resolution().unwrap_err();
        assert_eq!(err.operation, "desktop_resolution");
        assert!(backend.set_fullscreen(window, WindowMode::Fullscreen).is_err());
        assert!(backend.set_fullscreen(window, WindowMode::Windowed).is_ok());
    }

    #[test]
    fn waker_interrupts_a_blocking_wait() {
        let mut backend = HeadlessBackend::new().blocking();
        let waker = backend.waker();
        let thread = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            waker.wake();
        });
        assert_eq!(next(&mut backend), Classified::Wake);
        thread.join().unwrap();
    }

    #[test]
    fn shutdown_releases_everything() {
        let mut backend = HeadlessBackend::new();
        let stats = backend.stats();
        backend.create_window(&descriptor(WindowFlags::empty())).unwrap();
        let icon = IconImage::from_rgba(1, 1, vec![0; 4]).unwrap();
        backend.create_icon(&icon).unwrap();

        backend.shutdown();
        assert_eq!(backend.window_count(), 0);
        assert_eq!(backend.icon_count(), 0);
        assert_eq!(stats.shutdowns(), 1);
        assert_eq!(stats.icons_created(), 1);
    }
}
