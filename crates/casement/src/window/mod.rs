//! The window facade
//!
//! [`Window`] owns one native window, its cached [`WindowState`] and the
//! observers subscribed to its events. `show()` creates the native window and
//! runs the event pump on the calling thread until the window closes.
//!
//! Mutators clamp rather than reject, need a live native window (returning
//! [`WindowError::NotRunning`] otherwise) and never fire events themselves:
//! notifications only come from what the backend reports through the pump.

mod dispatch;
pub mod geometry;
mod mode;
mod proxy;
mod state;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use geometry::{BoundKind, SizeBounds};
pub use mode::WindowedSnapshot;
pub use proxy::{WindowCommand, WindowProxy};
pub use state::{Position, Size, WindowMode, WindowState};

use self::geometry::{clamp_opacity, clamp_position};
use self::mode::ModeController;
use crate::backend::{
    GlSettings, IconHandle, NativeHandle, VSync, WindowBackend, WindowDescriptor, WindowFlags,
};
use crate::config::{Config, ConfigError, SizeSetting, WindowConfig};
use crate::error::{WindowError, WindowResult};
use crate::events::{Event, EventSystem, EventType, Subscription};
use crate::icon::IconImage;
use crate::platform::Platform;

/// Settings applied right after the native window is created
#[derive(Debug, Clone, Default)]
struct InitialSettings {
    position: Option<Position>,
    min_size: Option<SizeSetting>,
    max_size: Option<SizeSetting>,
    opacity: Option<f32>,
    icon: Option<PathBuf>,
    gl: Option<GlSettings>,
}

/// A desktop window driven by a native backend
pub struct Window<B: WindowBackend> {
    platform: Platform<B>,
    title: String,
    requested: (i32, i32),
    flags: WindowFlags,
    settings: InitialSettings,
    state: WindowState,
    modes: ModeController,
    events: EventSystem<Window<B>>,
    commands: proxy::CommandQueue,
    closed_notified: bool,
    finished: bool,
}

impl<B: WindowBackend> Window<B> {
    /// Describe a window; nothing is created until [`Window::show`]
    pub fn new(
        platform: &Platform<B>,
        title: impl Into<String>,
        width: i32,
        height: i32,
        flags: WindowFlags,
    ) -> Self {
        Self {
            platform: platform.clone(),
            title: title.into(),
            requested: (width, height),
            flags,
            settings: InitialSettings::default(),
            state: WindowState::default(),
            modes: ModeController::default(),
            events: EventSystem::new(),
            commands: Arc::default(),
            closed_notified: false,
            finished: false,
        }
    }

    /// Describe a window from a configuration
    pub fn from_config(platform: &Platform<B>, config: &WindowConfig) -> Self {
        let mut window = Self::new(
            platform,
            config.title.clone(),
            config.width,
            config.height,
            config.flags(),
        );
        window.settings = InitialSettings {
            position: config.position,
            min_size: config.min_size,
            max_size: config.max_size,
            opacity: Some(config.opacity),
            icon: config.icon.clone(),
            gl: config.gl,
        };
        window
    }

    /// Describe a window from a `.toml` or `.ron` configuration file
    ///
    /// The loaded configuration must pass [`WindowConfig::validate`].
    pub fn from_config_file(platform: &Platform<B>, path: impl AsRef<Path>) -> WindowResult<Self> {
        let path = path.as_ref();
        let config = WindowConfig::load_from_file(path)?;
        config.validate().map_err(|reason| ConfigError::Invalid {
            path: path.display().to_string(),
            reason,
        })?;
        Ok(Self::from_config(platform, &config))
    }

    /// Ask for an OpenGL context when the window is created
    ///
    /// Context attributes are fixed at creation, so this is rejected while a
    /// native window exists.
    pub fn request_gl_context(&mut self, settings: GlSettings) -> WindowResult<()> {
        if self.state.handle.is_some() {
            return Err(WindowError::AlreadyRunning);
        }
        self.flags |= WindowFlags::OPENGL;
        self.settings.gl = Some(settings);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Create the native window and run the event pump until it closes
    ///
    /// Blocks the calling thread. Fires [`Event::Loaded`] once the window
    /// exists, then one notification per backend event. When the pump stops
    /// the state is reset to defaults; a closed window cannot be shown again.
    pub fn show(&mut self) -> WindowResult<()> {
        if self.state.handle.is_some() {
            return Err(WindowError::AlreadyRunning);
        }
        if self.finished {
            return Err(WindowError::Finished);
        }

        self.open()?;
        self.notify(&Event::Loaded);
        self.pump();

        self.release_native();
        self.state = WindowState::default();
        self.modes = ModeController::default();
        self.finished = true;
        self.commands.close();
        Ok(())
    }

    /// Create the native window and mark it running, without pumping
    pub(crate) fn open(&mut self) -> WindowResult<()> {
        self.create()?;
        self.state.running = true;
        Ok(())
    }

    fn create(&mut self) -> WindowResult<()> {
        let (width, height) = self.requested;
        let descriptor = WindowDescriptor {
            title: self.title.clone(),
            size: SizeBounds::UNBOUNDED.clamp(width, height),
            position: self.settings.position.map(|p| clamp_position(p.x, p.y)),
            flags: self.flags,
            gl: self
                .flags
                .contains(WindowFlags::OPENGL)
                .then(|| self.settings.gl.unwrap_or_default()),
        };

        let handle = self.platform.backend().create_window(&descriptor)?;
        self.state = self.seed_state(handle, &descriptor);
        self.closed_notified = false;

        log::info!(
            "Created window '{}' ({}x{})",
            self.state.title,
            self.state.size.width,
            self.state.size.height
        );

        if let Err(err) = self.apply_settings() {
            log::error!("Applying initial window settings failed: {err}");
            self.release_native();
            self.state = WindowState::default();
            return Err(err);
        }
        Ok(())
    }

    fn seed_state(&self, handle: NativeHandle, descriptor: &WindowDescriptor) -> WindowState {
        let backend = self.platform.backend();
        let size = backend.window_size(handle).unwrap_or(descriptor.size);
        let position = backend
            .window_position(handle)
            .unwrap_or_else(|_| descriptor.position.unwrap_or_default());

        WindowState {
            handle: Some(handle),
            title: descriptor.title.clone(),
            size,
            position: clamp_position(position.x, position.y),
            resizable: descriptor.flags.contains(WindowFlags::RESIZABLE),
            gl_context: descriptor.gl.is_some(),
            vsync: descriptor.gl.map_or(VSync::Unknown, |gl| gl.vsync),
            ..WindowState::default()
        }
    }

    fn apply_settings(&mut self) -> WindowResult<()> {
        let settings = self.settings.clone();
        if let Some(min) = settings.min_size {
            self.set_minimum_size(min.width, min.height)?;
        }
        if let Some(max) = settings.max_size {
            self.set_maximum_size(max.width, max.height)?;
        }
        if let Some(opacity) = settings.opacity {
            self.change_opacity(opacity)?;
        }
        if let Some(position) = settings.position {
            self.change_position(position.x, position.y)?;
        }
        if let Some(icon) = &settings.icon {
            self.change_icon(icon)?;
        }

        let mode = self.flags.mode();
        if mode != WindowMode::Windowed {
            self.change_window_mode(mode)?;
        }
        if self.flags.contains(WindowFlags::MAXIMIZED) {
            self.maximize()?;
        } else if self.flags.contains(WindowFlags::MINIMIZED) {
            self.minimize()?;
        }
        Ok(())
    }

    /// Close the window
    ///
    /// Fires [`Event::Closed`] while the native window still exists, then
    /// releases the window and its icon. The pump stops after the current
    /// event. Safe to call from inside any observer, including a `Closed`
    /// observer; resources are released exactly once. Does nothing when no
    /// window exists.
    pub fn close(&mut self) -> WindowResult<()> {
        if self.state.handle.is_none() {
            return Ok(());
        }
        if !self.closed_notified {
            self.closed_notified = true;
            self.state.running = false;
            self.notify(&Event::Closed);
        }
        self.release_native();
        Ok(())
    }

    fn release_native(&mut self) {
        let Some(handle) = self.state.handle.take() else {
            return;
        };
        self.state.running = false;

        let mut backend = self.platform.backend();
        if let Some(icon) = self.state.icon.take() {
            backend.destroy_icon(icon);
        }
        backend.destroy_window(handle);
        log::info!("Window '{}' closed", self.state.title);
    }

    fn require_handle(&self) -> WindowResult<NativeHandle> {
        self.state.handle.ok_or(WindowError::NotRunning)
    }

    // ---------------------------------------------------------------------
    // Subscriptions
    // ---------------------------------------------------------------------

    /// Deliver an event to its observers, in registration order
    pub(crate) fn notify(&mut self, event: &Event) {
        log::debug!("Dispatching {:?}", event.event_type());
        for listener in self.events.listeners(event.event_type()) {
            listener.invoke(self, event);
        }
    }

    /// Observe one event type
    ///
    /// The observer receives the window itself and may call any mutator,
    /// subscribe or unsubscribe, or close the window.
    pub fn on(
        &mut self,
        event_type: EventType,
        handler: impl FnMut(&mut Self, &Event) + 'static,
    ) -> Subscription {
        self.events.subscribe(event_type, Box::new(handler))
    }

    /// Observe every event
    pub fn on_any(&mut self, handler: impl FnMut(&mut Self, &Event) + 'static) -> Subscription {
        self.events.subscribe_all(Box::new(handler))
    }

    /// Stop observing
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.events.unsubscribe(subscription)
    }

    /// Called once the native window exists, before the first event
    pub fn on_loaded(&mut self, mut handler: impl FnMut(&mut Self) + 'static) -> Subscription {
        self.on(EventType::Loaded, move |window, _| handler(window))
    }

    /// Called when the window closes, while its state can still be queried
    pub fn on_closed(&mut self, mut handler: impl FnMut(&mut Self) + 'static) -> Subscription {
        self.on(EventType::Closed, move |window, _| handler(window))
    }

    /// Called when the user resizes the window
    pub fn on_resized(
        &mut self,
        mut handler: impl FnMut(&mut Self, i32, i32) + 'static,
    ) -> Subscription {
        self.on(EventType::Resized, move |window, event| {
            if let Event::Resized { width, height } = event {
                handler(window, *width, *height);
            }
        })
    }

    /// Called when the window size changed, with the size read back from the backend
    pub fn on_size_changed(
        &mut self,
        mut handler: impl FnMut(&mut Self, i32, i32) + 'static,
    ) -> Subscription {
        self.on(EventType::SizeChanged, move |window, event| {
            if let Event::SizeChanged { width, height } = event {
                handler(window, *width, *height);
            }
        })
    }

    /// Called when the window moved
    pub fn on_moved(&mut self, mut handler: impl FnMut(&mut Self, i32, i32) + 'static) -> Subscription {
        self.on(EventType::Moved, move |window, event| {
            if let Event::Moved { x, y } = event {
                handler(window, *x, *y);
            }
        })
    }

    /// Called when a key is pressed, with its key code
    pub fn on_key_down(&mut self, mut handler: impl FnMut(&mut Self, i32) + 'static) -> Subscription {
        self.on(EventType::KeyDown, move |window, event| {
            if let Event::KeyDown { keycode, .. } = event {
                handler(window, *keycode);
            }
        })
    }

    // ---------------------------------------------------------------------
    // Mutators
    // ---------------------------------------------------------------------

    /// Resize, clamped to the current bounds
    pub fn change_size(&mut self, width: i32, height: i32) -> WindowResult<()> {
        let handle = self.require_handle()?;
        let size = geometry::clamp_size(width, height, &self.state);
        self.platform.backend().set_window_size(handle, size);
        self.state.size = size;
        Ok(())
    }

    /// Move, with negative coordinates clamped to zero
    pub fn change_position(&mut self, x: i32, y: i32) -> WindowResult<()> {
        let handle = self.require_handle()?;
        let position = clamp_position(x, y);
        self.platform.backend().set_window_position(handle, position);
        self.state.position = position;
        Ok(())
    }

    /// Set the minimum size; grows the window if it is smaller
    ///
    /// Outside windowed mode this updates the bounds restored on return.
    pub fn set_minimum_size(&mut self, width: i32, height: i32) -> WindowResult<()> {
        self.set_bound(BoundKind::Min, width, height)
    }

    /// Set the maximum size; shrinks the window if it is larger
    ///
    /// Outside windowed mode this updates the bounds restored on return.
    pub fn set_maximum_size(&mut self, width: i32, height: i32) -> WindowResult<()> {
        self.set_bound(BoundKind::Max, width, height)
    }

    fn set_bound(&mut self, kind: BoundKind, width: i32, height: i32) -> WindowResult<()> {
        let handle = self.require_handle()?;
        if let Some(snapshot) = self.modes.snapshot_mut() {
            snapshot.set_bound(kind, width, height);
            return Ok(());
        }

        let size = geometry::set_bounds(kind, width, height, &mut self.state);
        let mut backend = self.platform.backend();
        backend.set_size_limits(handle, self.state.min_size, self.state.max_size);
        backend.set_window_size(handle, size);
        Ok(())
    }

    /// Widen the bounds to `[1x1, desktop]`
    pub fn unbound(&mut self) -> WindowResult<()> {
        self.require_handle()?;
        if let Some(snapshot) = self.modes.snapshot_mut() {
            let desktop = self.platform.backend().desktop_resolution()?;
            let (width, height) = desktop.to_native();
            snapshot.set_bound(BoundKind::Max, width, height);
            snapshot.set_bound(BoundKind::Min, 1, 1);
            return Ok(());
        }
        mode::unbound(&mut *self.platform.backend(), &mut self.state)
    }

    /// Allow or forbid user resizing
    ///
    /// Outside windowed mode the window stays resizable and the flag is
    /// applied when returning to windowed mode.
    pub fn set_resizable(&mut self, resizable: bool) -> WindowResult<()> {
        let handle = self.require_handle()?;
        if let Some(snapshot) = self.modes.snapshot_mut() {
            snapshot.resizable = resizable;
            return Ok(());
        }
        self.platform.backend().set_resizable(handle, resizable);
        self.state.resizable = resizable;
        Ok(())
    }

    /// Change the title
    pub fn change_title(&mut self, title: impl Into<String>) -> WindowResult<()> {
        let handle = self.require_handle()?;
        let title = title.into();
        self.platform.backend().set_title(handle, &title);
        self.state.title = title;
        Ok(())
    }

    /// Change the opacity, clamped to `[0, 1]`
    pub fn change_opacity(&mut self, opacity: f32) -> WindowResult<()> {
        let handle = self.require_handle()?;
        let opacity = clamp_opacity(opacity);
        self.platform.backend().set_opacity(handle, opacity)?;
        self.state.opacity = opacity;
        Ok(())
    }

    /// Load an icon from a BMP or PNG file and assign it
    ///
    /// A missing file is silently ignored; a file that exists but cannot be
    /// decoded is an error.
    pub fn change_icon(&mut self, path: impl AsRef<Path>) -> WindowResult<()> {
        let handle = self.require_handle()?;
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("Icon {} does not exist, keeping current icon", path.display());
            return Ok(());
        }

        let image = IconImage::from_file(path).map_err(|source| WindowError::Icon {
            path: path.to_path_buf(),
            source,
        })?;

        let mut backend = self.platform.backend();
        let icon = backend.create_icon(&image)?;
        backend.set_window_icon(handle, icon);
        if let Some(previous) = self.state.icon.replace(icon) {
            backend.destroy_icon(previous);
        }
        Ok(())
    }

    /// Switch between windowed, borderless and fullscreen
    pub fn change_window_mode(&mut self, mode: WindowMode) -> WindowResult<()> {
        self.modes
            .change_mode(&mut *self.platform.backend(), &mut self.state, mode)
    }

    /// Minimize the window
    pub fn minimize(&mut self) -> WindowResult<()> {
        let handle = self.require_handle()?;
        self.platform.backend().minimize(handle);
        self.state.mark_minimized();
        Ok(())
    }

    /// Maximize the window
    pub fn maximize(&mut self) -> WindowResult<()> {
        let handle = self.require_handle()?;
        self.platform.backend().maximize(handle);
        self.state.mark_maximized();
        Ok(())
    }

    /// Restore from minimized or maximized
    pub fn restore(&mut self) -> WindowResult<()> {
        let handle = self.require_handle()?;
        self.platform.backend().restore(handle);
        self.state.mark_restored();
        Ok(())
    }

    /// Raise the window and give it input focus
    pub fn focus(&mut self) -> WindowResult<()> {
        let handle = self.require_handle()?;
        self.platform.backend().raise(handle);
        self.state.focused = true;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // OpenGL
    // ---------------------------------------------------------------------

    fn require_gl(&self) -> WindowResult<NativeHandle> {
        let handle = self.require_handle()?;
        if self.state.gl_context {
            Ok(handle)
        } else {
            Err(WindowError::NoGlContext)
        }
    }

    /// Present the OpenGL back buffer
    pub fn swap_buffers(&mut self) -> WindowResult<()> {
        let handle = self.require_gl()?;
        self.platform.backend().swap_buffers(handle)?;
        Ok(())
    }

    /// Turn vertical synchronization on or off
    pub fn set_vsync(&mut self, vsync: VSync) -> WindowResult<()> {
        let handle = self.require_gl()?;
        self.platform.backend().set_swap_interval(handle, vsync)?;
        self.state.vsync = vsync;
        Ok(())
    }

    /// Framebuffer size in pixels, read from the backend
    pub fn drawable_size(&self) -> WindowResult<Size> {
        let handle = self.require_handle()?;
        Ok(self.platform.backend().drawable_size(handle)?)
    }

    /// Whether the window has an OpenGL context
    pub const fn has_gl_context(&self) -> bool {
        self.state.gl_context
    }

    /// Swap interval of the OpenGL context
    pub const fn vsync(&self) -> VSync {
        self.state.vsync
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Cached window state
    pub const fn state(&self) -> &WindowState {
        &self.state
    }

    /// Platform this window was created from
    pub const fn platform(&self) -> &Platform<B> {
        &self.platform
    }

    /// Size as the backend reports it right now, bypassing the cache
    pub fn realtime_size(&self) -> WindowResult<Size> {
        let handle = self.require_handle()?;
        Ok(self.platform.backend().window_size(handle)?)
    }

    /// User geometry that returning to windowed mode will restore
    pub fn windowed_snapshot(&self) -> Option<&WindowedSnapshot> {
        self.modes.snapshot()
    }

    /// Native handle, `None` while no window exists
    pub const fn handle(&self) -> Option<NativeHandle> {
        self.state.handle
    }

    /// Title
    pub fn title(&self) -> &str {
        &self.state.title
    }

    /// Last committed size
    pub const fn size(&self) -> Size {
        self.state.size
    }

    /// Position
    pub const fn position(&self) -> Position {
        self.state.position
    }

    /// Current minimum size
    pub const fn minimum_size(&self) -> Size {
        self.state.min_size
    }

    /// Current maximum size
    pub const fn maximum_size(&self) -> Size {
        self.state.max_size
    }

    /// Opacity
    pub const fn opacity(&self) -> f32 {
        self.state.opacity
    }

    /// Display mode
    pub const fn mode(&self) -> WindowMode {
        self.state.mode
    }

    /// Whether the native window is resizable right now
    pub const fn is_resizable(&self) -> bool {
        self.state.resizable
    }

    /// Whether the window is minimized
    pub const fn is_minimized(&self) -> bool {
        self.state.minimized
    }

    /// Whether the window is maximized
    pub const fn is_maximized(&self) -> bool {
        self.state.maximized
    }

    /// Whether the window has input focus
    pub const fn is_focused(&self) -> bool {
        self.state.focused
    }

    /// Whether the event pump is running
    pub const fn is_running(&self) -> bool {
        self.state.running
    }

    /// Assigned icon
    pub const fn icon(&self) -> Option<IconHandle> {
        self.state.icon
    }
}

impl<B: WindowBackend> Drop for Window<B> {
    fn drop(&mut self) {
        self.commands.close();
        if self.state.handle.is_some() {
            self.release_native();
        }
    }
}

impl<B: WindowBackend> std::fmt::Debug for Window<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("state", &self.state)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessBackend;
    use approx::assert_relative_eq;

    fn opened(width: i32, height: i32) -> Window<HeadlessBackend> {
        let platform = Platform::new(HeadlessBackend::new());
        let mut window = Window::new(&platform, "test", width, height, WindowFlags::RESIZABLE);
        window.open().unwrap();
        window
    }

    #[test]
    fn creation_seeds_state_from_backend() {
        let window = opened(500, 400);
        assert!(window.is_running());
        assert_eq!(window.size(), Size::new(500, 400));
        assert_eq!(window.minimum_size(), Size::MIN);
        assert_eq!(window.maximum_size(), Size::MAX);
        assert!(window.is_resizable());
        assert_eq!(window.title(), "test");
    }

    #[test]
    fn degenerate_requested_size_becomes_one_pixel() {
        let window = opened(0, -20);
        assert_eq!(window.size(), Size::MIN);
    }

    #[test]
    fn lowering_maximum_shrinks_window() {
        let mut window = opened(500, 400);
        window.set_maximum_size(300, 300).unwrap();
        assert_eq!(window.size(), Size::new(300, 300));
        assert_eq!(window.realtime_size().unwrap(), Size::new(300, 300));
    }

    #[test]
    fn raising_minimum_grows_window() {
        let mut window = opened(200, 200);
        window.set_minimum_size(640, 480).unwrap();
        assert_eq!(window.size(), Size::new(640, 480));
        assert_eq!(window.realtime_size().unwrap(), Size::new(640, 480));
    }

    #[test]
    fn opacity_and_position_are_clamped() {
        let mut window = opened(100, 100);
        window.change_opacity(11111.0).unwrap();
        assert_relative_eq!(window.opacity(), 1.0);
        window.change_opacity(-1.0).unwrap();
        assert_relative_eq!(window.opacity(), 0.0);

        window.change_position(-1, -1).unwrap();
        assert_eq!(window.position(), Position::new(0, 0));
    }

    #[test]
    fn bounds_set_in_fullscreen_apply_on_return() {
        let mut window = opened(500, 400);
        window.set_resizable(false).unwrap();
        window.change_window_mode(WindowMode::Fullscreen).unwrap();

        window.set_maximum_size(300, 200).unwrap();
        window.set_resizable(true).unwrap();
        assert_eq!(window.maximum_size(), Size::new(1920, 1080));
        assert_eq!(window.size(), Size::new(500, 400));

        window.change_window_mode(WindowMode::Windowed).unwrap();
        assert_eq!(window.maximum_size(), Size::new(300, 200));
        assert_eq!(window.size(), Size::new(300, 200));
        assert!(window.is_resizable());
    }

    #[test]
    fn missing_icon_is_ignored_and_bad_icon_is_reported() {
        let mut window = opened(100, 100);
        window.change_icon("/definitely/not/here.bmp").unwrap();
        assert!(window.icon().is_none());

        let path = std::env::temp_dir().join(format!("casement-bad-{}.bmp", std::process::id()));
        std::fs::write(&path, b"not a bitmap").unwrap();
        let result = window.change_icon(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(WindowError::Icon { .. })));
    }

    #[test]
    fn replacing_icon_releases_previous_one() {
        let mut window = opened(100, 100);
        let stats = window.platform().with_backend(|b| b.stats());
        let path = std::env::temp_dir().join(format!("casement-ok-{}.bmp", std::process::id()));
        image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 255, 255]))
            .save(&path)
            .unwrap();

        window.change_icon(&path).unwrap();
        let first = window.icon();
        window.change_icon(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_ne!(window.icon(), first);
        assert_eq!(stats.icons_destroyed(), 1);

        window.close().unwrap();
        assert_eq!(stats.icons_destroyed(), 2);
        assert_eq!(stats.windows_destroyed(), 1);
    }

    #[test]
    fn gl_context_is_opt_in() {
        let mut plain = opened(320, 240);
        assert!(!plain.has_gl_context());
        assert!(matches!(plain.swap_buffers(), Err(WindowError::NoGlContext)));
        assert!(matches!(
            plain.set_vsync(VSync::Enabled),
            Err(WindowError::NoGlContext)
        ));
        assert_eq!(plain.drawable_size().unwrap(), Size::new(320, 240));
        assert!(matches!(
            plain.request_gl_context(GlSettings::default()),
            Err(WindowError::AlreadyRunning)
        ));
    }

    #[test]
    fn gl_window_presents_frames_and_tracks_vsync() {
        let platform = Platform::new(HeadlessBackend::new());
        let mut window = Window::new(&platform, "gl", 640, 480, WindowFlags::RESIZABLE);
        window
            .request_gl_context(GlSettings::default().with_vsync(VSync::Disabled))
            .unwrap();
        window.open().unwrap();

        assert!(window.has_gl_context());
        assert_eq!(window.vsync(), VSync::Disabled);
        window.swap_buffers().unwrap();
        window.set_vsync(VSync::Enabled).unwrap();
        assert_eq!(window.vsync(), VSync::Enabled);

        let handle = window.handle().unwrap();
        let (frames, vsync) = platform.with_backend(|b| {
            let native = b.window(handle).unwrap();
            (native.frames_presented, native.vsync)
        });
        assert_eq!(frames, 1);
        assert_eq!(vsync, VSync::Enabled);

        window.close().unwrap();
        assert!(matches!(window.swap_buffers(), Err(WindowError::NotRunning)));
    }

    #[test]
    fn gl_state_resets_after_show() {
        let platform = Platform::headless();
        let mut window = Window::new(&platform, "gl", 100, 100, WindowFlags::OPENGL);
        window.on_loaded(|w| {
            assert!(w.has_gl_context());
            assert_eq!(w.vsync(), VSync::Enabled);
            w.swap_buffers().unwrap();
        });
        window.show().unwrap();
        assert!(!window.has_gl_context());
        assert_eq!(window.vsync(), VSync::Unknown);
    }

    #[test]
    fn show_twice_is_rejected() {
        let platform = Platform::headless();
        let mut window = Window::new(&platform, "twice", 100, 100, WindowFlags::empty());
        window.show().unwrap();
        assert!(matches!(window.show(), Err(WindowError::Finished)));
        assert!(window.handle().is_none());
    }

    #[test]
    fn config_settings_are_applied_after_creation() {
        let platform = Platform::headless();
        let config = WindowConfig::new("configured", 900, 700)
            .with_max_size(640, 480)
            .with_opacity(3.0)
            .with_position(-5, 40)
            .with_mode(WindowMode::Borderless);
        let mut window = Window::from_config(&platform, &config);
        window.open().unwrap();

        assert_eq!(window.mode(), WindowMode::Borderless);
        assert_relative_eq!(window.opacity(), 1.0);
        assert_eq!(window.position(), Position::new(0, 40));
        let snapshot = window.windowed_snapshot().unwrap();
        assert_eq!(snapshot.max_size, Size::new(640, 480));
        assert_eq!(snapshot.size, Size::new(640, 480));
    }
}
