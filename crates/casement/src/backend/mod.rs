//! Native windowing backend abstraction
//!
//! [`WindowBackend`] is the seam between the window core and whatever
//! actually puts pixels on screen. The core only ever talks to a backend
//! through opaque [`NativeHandle`]s and reads events as flat
//! [`NativeEvent`](crate::events::native::NativeEvent) records.
//!
//! Two implementations ship with the crate:
//! - [`headless::HeadlessBackend`]: in-memory windows and a scripted event
//!   queue, for tests and tools that never open a real window
//! - `glfw::GlfwBackend` (feature `glfw`): real desktop windows

pub mod gl;
pub mod headless;

#[cfg(feature = "glfw")]
pub mod glfw;

use std::num::NonZeroU64;
use std::sync::Arc;

use bitflags::bitflags;

pub use self::gl::{GlProfile, GlSettings, VSync};

use crate::error::BackendError;
use crate::events::native::NativeEvent;
use crate::icon::IconImage;
use crate::window::{Position, Size, WindowMode};

/// Opaque identifier of a native window; never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(NonZeroU64);

impl NativeHandle {
    /// Wrap a raw backend identifier; zero is the "no window" sentinel
    pub const fn from_raw(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Raw backend identifier
    pub const fn raw(self) -> u64 {
        self.0.get()
    }
}

/// Opaque identifier of a backend icon resource; never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconHandle(NonZeroU64);

impl IconHandle {
    /// Wrap a raw backend identifier
    pub const fn from_raw(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Raw backend identifier
    pub const fn raw(self) -> u64 {
        self.0.get()
    }
}

bitflags! {
    /// Creation flags for a native window
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u32 {
        /// User may resize the window
        const RESIZABLE = 1 << 0;
        /// Create without showing
        const HIDDEN = 1 << 1;
        /// Start in borderless desktop mode
        const BORDERLESS = 1 << 2;
        /// Start in exclusive fullscreen; wins over `BORDERLESS`
        const FULLSCREEN = 1 << 3;
        /// Start maximized
        const MAXIMIZED = 1 << 4;
        /// Start minimized
        const MINIMIZED = 1 << 5;
        /// Create an OpenGL context with the window
        const OPENGL = 1 << 6;
    }
}

impl WindowFlags {
    /// Display mode requested by these flags
    pub fn mode(self) -> WindowMode {
        if self.contains(Self::FULLSCREEN) {
            WindowMode::Fullscreen
        } else if self.contains(Self::BORDERLESS) {
            WindowMode::Borderless
        } else {
            WindowMode::Windowed
        }
    }
}

/// Everything a backend needs to create a window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDescriptor {
    /// Window title
    pub title: String,
    /// Initial client size, already clamped
    pub size: Size,
    /// Initial position; `None` lets the backend choose
    pub position: Option<Position>,
    /// Creation flags
    pub flags: WindowFlags,
    /// Context attributes; present exactly when `flags` contains `OPENGL`
    pub gl: Option<GlSettings>,
}

/// Thread-safe handle that interrupts a blocking [`WindowBackend::wait_event`]
pub trait Wake: Send + Sync {
    /// Make the pending or next wait return promptly
    fn wake(&self);
}

/// Operations the window core needs from a native windowing system
///
/// Window operations are only ever called from the thread running the event
/// pump; [`WindowBackend::waker`] is the only piece that crosses threads.
pub trait WindowBackend {
    /// Create a native window
    fn create_window(&mut self, descriptor: &WindowDescriptor)
        -> Result<NativeHandle, BackendError>;

    /// Destroy a native window; the handle is invalid afterwards
    fn destroy_window(&mut self, window: NativeHandle);

    /// Current client size as reported by the platform
    fn window_size(&self, window: NativeHandle) -> Result<Size, BackendError>;

    /// Resize the client area
    fn set_window_size(&mut self, window: NativeHandle, size: Size);

    /// Set the minimum and maximum client size
    fn set_size_limits(&mut self, window: NativeHandle, min: Size, max: Size);

    /// Current position of the top-left corner
    fn window_position(&self, window: NativeHandle) -> Result<Position, BackendError>;

    /// Move the window
    fn set_window_position(&mut self, window: NativeHandle, position: Position);

    /// Set opacity in `[0, 1]`
    fn set_opacity(&mut self, window: NativeHandle, opacity: f32) -> Result<(), BackendError>;

    /// Toggle user resizing
    fn set_resizable(&mut self, window: NativeHandle, resizable: bool);

    /// Switch the native display mode
    fn set_fullscreen(&mut self, window: NativeHandle, mode: WindowMode)
        -> Result<(), BackendError>;

    /// Change the title
    fn set_title(&mut self, window: NativeHandle, title: &str);

    /// Upload icon pixels
    fn create_icon(&mut self, image: &IconImage) -> Result<IconHandle, BackendError>;

    /// Assign an uploaded icon to a window
    fn set_window_icon(&mut self, window: NativeHandle, icon: IconHandle);

    /// Release an uploaded icon
    fn destroy_icon(&mut self, icon: IconHandle);

    /// Minimize (iconify) the window
    fn minimize(&mut self, window: NativeHandle);

    /// Maximize the window
    fn maximize(&mut self, window: NativeHandle);

    /// Restore from minimized or maximized
    fn restore(&mut self, window: NativeHandle);

    /// Raise the window and give it input focus
    fn raise(&mut self, window: NativeHandle);

    /// Change the swap interval of the window's OpenGL context
    fn set_swap_interval(&mut self, window: NativeHandle, vsync: VSync)
        -> Result<(), BackendError>;

    /// Present the back buffer of the window's OpenGL context
    fn swap_buffers(&mut self, window: NativeHandle) -> Result<(), BackendError>;

    /// Framebuffer size in pixels, which differs from the client size on
    /// scaled displays
    fn drawable_size(&self, window: NativeHandle) -> Result<Size, BackendError>;

    /// Resolution of the primary display's current video mode
    fn desktop_resolution(&mut self) -> Result<Size, BackendError>;

    /// Block until the next event is available
    fn wait_event(&mut self) -> NativeEvent;

    /// Handle that can wake [`Self::wait_event`] from another thread
    fn waker(&self) -> Arc<dyn Wake>;

    /// Tear down the native subsystem; called once by the last
    /// [`Platform`](crate::platform::Platform) owner
    fn shutdown(&mut self) {}
}
