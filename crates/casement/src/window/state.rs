//! Authoritative cached window state
//!
//! [`WindowState`] mirrors what the native window looks like so queries never
//! need a round trip to the backend. It is mutated only by the dispatch loop
//! and by the window's mutator calls.

use serde::{Deserialize, Serialize};

use crate::backend::{IconHandle, NativeHandle, VSync};

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Largest value an axis may take; stands in for "no upper bound".
    ///
    /// Native backends store sizes as signed ints, so this is `i32::MAX`.
    pub const UNBOUNDED: u32 = i32::MAX as u32;

    /// Smallest size a window may have
    pub const MIN: Self = Self::new(1, 1);

    /// Upper bound used when no maximum was set
    pub const MAX: Self = Self::new(Self::UNBOUNDED, Self::UNBOUNDED);

    /// Create a size
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Build a size from signed native values, treating negatives as zero
    pub const fn from_native(width: i32, height: i32) -> Self {
        Self::new(non_negative(width), non_negative(height))
    }

    /// Size as signed native values
    pub fn to_native(self) -> (i32, i32) {
        (
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }
}

/// Window position in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate of the top-left corner
    pub x: i32,
    /// Vertical coordinate of the top-left corner
    pub y: i32,
}

impl Position {
    /// Create a position
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Display mode of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WindowMode {
    /// Normal decorated window
    #[default]
    Windowed,
    /// Undecorated window covering the desktop
    Borderless,
    /// Exclusive fullscreen on the primary display
    Fullscreen,
}

impl WindowMode {
    /// Whether this mode replaces the user's bounds with the desktop resolution
    pub const fn covers_desktop(self) -> bool {
        !matches!(self, Self::Windowed)
    }
}

/// Cached record of a window's geometry, mode and flags
#[derive(Debug, Clone, PartialEq)]
pub struct WindowState {
    pub(crate) handle: Option<NativeHandle>,
    pub(crate) title: String,
    pub(crate) size: Size,
    pub(crate) min_size: Size,
    pub(crate) max_size: Size,
    pub(crate) position: Position,
    pub(crate) opacity: f32,
    pub(crate) mode: WindowMode,
    pub(crate) resizable: bool,
    pub(crate) minimized: bool,
    pub(crate) maximized: bool,
    pub(crate) focused: bool,
    pub(crate) running: bool,
    pub(crate) icon: Option<IconHandle>,
    pub(crate) gl_context: bool,
    pub(crate) vsync: VSync,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            handle: None,
            title: String::new(),
            size: Size::MIN,
            min_size: Size::MIN,
            max_size: Size::MAX,
            position: Position::default(),
            opacity: 1.0,
            mode: WindowMode::Windowed,
            resizable: false,
            minimized: false,
            maximized: false,
            focused: false,
            running: false,
            icon: None,
            gl_context: false,
            vsync: VSync::Unknown,
        }
    }
}

impl WindowState {
    /// Native handle, `None` while no window exists
    pub const fn handle(&self) -> Option<NativeHandle> {
        self.handle
    }

    /// Window title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Last committed size
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Current minimum size
    pub const fn minimum_size(&self) -> Size {
        self.min_size
    }

    /// Current maximum size
    pub const fn maximum_size(&self) -> Size {
        self.max_size
    }

    /// Current position
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Opacity in `[0.0, 1.0]`
    pub const fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Display mode
    pub const fn mode(&self) -> WindowMode {
        self.mode
    }

    /// Whether the native window is currently resizable
    pub const fn is_resizable(&self) -> bool {
        self.resizable
    }

    /// Whether the window is minimized
    pub const fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Whether the window is maximized
    pub const fn is_maximized(&self) -> bool {
        self.maximized
    }

    /// Whether the window has input focus
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Whether the event pump is running
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Icon currently assigned to the window
    pub const fn icon(&self) -> Option<IconHandle> {
        self.icon
    }

    /// Whether the window was created with an OpenGL context
    pub const fn has_gl_context(&self) -> bool {
        self.gl_context
    }

    /// Swap interval of the OpenGL context
    pub const fn vsync(&self) -> VSync {
        self.vsync
    }

    /// Record a minimize; minimized and maximized are mutually exclusive.
    pub(crate) fn mark_minimized(&mut self) {
        self.minimized = true;
        self.maximized = false;
    }

    pub(crate) fn mark_maximized(&mut self) {
        self.maximized = true;
        self.minimized = false;
    }

    pub(crate) fn mark_restored(&mut self) {
        self.minimized = false;
        self.maximized = false;
    }
}

const fn non_negative(value: i32) -> u32 {
    if value < 0 {
        0
    } else {
        value.unsigned_abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_window_and_open_bounds() {
        let state = WindowState::default();
        assert!(state.handle().is_none());
        assert_eq!(state.minimum_size(), Size::MIN);
        assert_eq!(state.maximum_size(), Size::MAX);
        assert_eq!(state.mode(), WindowMode::Windowed);
        assert!(!state.has_gl_context());
        assert_eq!(state.vsync(), VSync::Unknown);
        assert!((state.opacity() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn minimize_and_maximize_are_exclusive() {
        let mut state = WindowState::default();
        state.mark_maximized();
        state.mark_minimized();
        assert!(state.is_minimized() && !state.is_maximized());

        state.mark_maximized();
        assert!(state.is_maximized() && !state.is_minimized());

        state.mark_restored();
        assert!(!state.is_minimized() && !state.is_maximized());
    }

    #[test]
    fn native_sizes_drop_negative_values() {
        assert_eq!(Size::from_native(-5, 20), Size::new(0, 20));
        assert_eq!(Size::new(u32::MAX, 3).to_native(), (i32::MAX, 3));
    }
}
