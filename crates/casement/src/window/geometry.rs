//! Size and position negotiation
//!
//! Geometry requests are best-effort: every value is clamped into range, never
//! rejected. Sizes live in `[min, max]` with `min >= 1`; positions are clamped
//! to be non-negative with no upper bound, so a window may sit off-screen.

use super::state::{Position, Size, WindowState};

/// Which size constraint a bounds change targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// Minimum size
    Min,
    /// Maximum size
    Max,
}

/// Inclusive size range a window must stay within
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBounds {
    /// Smallest allowed size
    pub min: Size,
    /// Largest allowed size
    pub max: Size,
}

impl SizeBounds {
    /// Bounds that only enforce the 1x1 floor
    pub const UNBOUNDED: Self = Self {
        min: Size::MIN,
        max: Size::MAX,
    };

    /// Create bounds, raising `max` where it falls below `min`
    pub fn new(min: Size, max: Size) -> Self {
        let min = Size::new(min.width.max(1), min.height.max(1));
        let max = Size::new(max.width.max(min.width), max.height.max(min.height));
        Self { min, max }
    }

    /// Bounds currently stored in `state`
    pub const fn of(state: &WindowState) -> Self {
        Self {
            min: state.min_size,
            max: state.max_size,
        }
    }

    /// Clamp a requested size into these bounds
    pub fn clamp(&self, width: i32, height: i32) -> Size {
        Size::new(
            clamp_axis(width, self.min.width, self.max.width),
            clamp_axis(height, self.min.height, self.max.height),
        )
    }

    /// Clamp an existing size into these bounds
    pub fn clamp_size(&self, size: Size) -> Size {
        let (width, height) = size.to_native();
        self.clamp(width, height)
    }

    /// Replace one bound, dragging the other along if they would cross
    pub fn with_bound(self, kind: BoundKind, width: i32, height: i32) -> Self {
        let requested = Self::UNBOUNDED.clamp(width, height);
        match kind {
            BoundKind::Min => Self {
                min: requested,
                max: Size::new(
                    self.max.width.max(requested.width),
                    self.max.height.max(requested.height),
                ),
            },
            BoundKind::Max => Self {
                min: Size::new(
                    self.min.width.min(requested.width),
                    self.min.height.min(requested.height),
                ),
                max: requested,
            },
        }
    }

    /// Whether `size` already satisfies these bounds
    pub const fn contains(&self, size: Size) -> bool {
        size.width >= self.min.width
            && size.width <= self.max.width
            && size.height >= self.min.height
            && size.height <= self.max.height
    }
}

/// Clamp a requested size into the bounds stored in `state`
pub fn clamp_size(width: i32, height: i32, state: &WindowState) -> Size {
    SizeBounds::of(state).clamp(width, height)
}

/// Clamp a requested position to non-negative coordinates
pub fn clamp_position(x: i32, y: i32) -> Position {
    Position::new(x.max(0), y.max(0))
}

/// Clamp an opacity into `[0.0, 1.0]`; NaN counts as fully opaque
pub fn clamp_opacity(alpha: f32) -> f32 {
    if alpha.is_nan() {
        1.0
    } else {
        alpha.clamp(0.0, 1.0)
    }
}

/// Store a new minimum or maximum size and re-clamp the committed size
///
/// The requested bound is first floored at 1x1. If the new bound crosses the
/// opposite one, the opposite bound follows it so `min <= max` keeps holding.
/// Returns the committed size after re-clamping, which the caller must push to
/// the native window: lowering the maximum below the current size shrinks the
/// window and raising the minimum above it grows the window.
pub fn set_bounds(kind: BoundKind, width: i32, height: i32, state: &mut WindowState) -> Size {
    let bounds = SizeBounds::of(state).with_bound(kind, width, height);
    state.min_size = bounds.min;
    state.max_size = bounds.max;
    state.size = bounds.clamp_size(state.size);
    state.size
}

fn clamp_axis(requested: i32, min: u32, max: u32) -> u32 {
    let clamped = i64::from(requested).clamp(i64::from(min), i64::from(max.max(min)));
    u32::try_from(clamped).unwrap_or(min)
}
