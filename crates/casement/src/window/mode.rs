//! Windowed / borderless / fullscreen transitions
//!
//! Leaving windowed mode widens the bounds to the desktop resolution and forces
//! the window resizable; the user's bounds and resizable flag are parked in a
//! [`WindowedSnapshot`] and put back verbatim on return. A failed transition
//! leaves mode, bounds and the resizable flag exactly as they were.

use super::geometry::{self, BoundKind, SizeBounds};
use super::state::{Size, WindowMode, WindowState};
use crate::backend::{NativeHandle, WindowBackend};
use crate::error::{WindowError, WindowResult};

/// User geometry saved on leaving windowed mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowedSnapshot {
    /// User minimum size
    pub min_size: Size,
    /// User maximum size
    pub max_size: Size,
    /// Last committed windowed size
    pub size: Size,
    /// User resizable flag
    pub resizable: bool,
}

impl WindowedSnapshot {
    fn capture(state: &WindowState) -> Self {
        Self {
            min_size: state.min_size,
            max_size: state.max_size,
            size: state.size,
            resizable: state.resizable,
        }
    }

    /// Apply a bounds change to the parked geometry
    pub(crate) fn set_bound(&mut self, kind: BoundKind, width: i32, height: i32) {
        let bounds = SizeBounds::new(self.min_size, self.max_size).with_bound(kind, width, height);
        self.min_size = bounds.min;
        self.max_size = bounds.max;
        self.size = bounds.clamp_size(self.size);
    }
}

/// Drives display mode changes for one window
#[derive(Debug, Default)]
pub(crate) struct ModeController {
    snapshot: Option<WindowedSnapshot>,
}

impl ModeController {
    /// Geometry to restore when returning to windowed mode
    pub(crate) const fn snapshot(&self) -> Option<&WindowedSnapshot> {
        self.snapshot.as_ref()
    }

    /// Parked geometry, present only while a desktop-covering mode is active
    pub(crate) fn snapshot_mut(&mut self) -> Option<&mut WindowedSnapshot> {
        self.snapshot.as_mut()
    }

    /// Switch `state` to `target`
    pub(crate) fn change_mode<B: WindowBackend>(
        &mut self,
        backend: &mut B,
        state: &mut WindowState,
        target: WindowMode,
    ) -> WindowResult<()> {
        let handle = state.handle.ok_or(WindowError::NotRunning)?;
        let current = state.mode;
        if current == target {
            log::debug!("Window already in {target:?} mode");
            return Ok(());
        }

        log::debug!("Changing window mode {current:?} -> {target:?}");
        match (current.covers_desktop(), target.covers_desktop()) {
            (false, _) => self.enter_desktop(backend, state, handle, target),
            (true, true) => Self::switch_desktop(backend, state, handle, target),
            (true, false) => self.leave_desktop(backend, state, handle),
        }
    }

    fn enter_desktop<B: WindowBackend>(
        &mut self,
        backend: &mut B,
        state: &mut WindowState,
        handle: NativeHandle,
        target: WindowMode,
    ) -> WindowResult<()> {
        let desktop = SizeBounds::new(Size::MIN, backend.desktop_resolution()?);
        let snapshot = WindowedSnapshot::capture(state);

        backend.set_size_limits(handle, desktop.min, desktop.max);
        if !snapshot.resizable {
            backend.set_resizable(handle, true);
        }

        if let Err(err) = backend.set_fullscreen(handle, target) {
            log::error!("Entering {target:?} mode failed: {err}");
            backend.set_size_limits(handle, snapshot.min_size, snapshot.max_size);
            if !snapshot.resizable {
                backend.set_resizable(handle, false);
            }
            return Err(err.into());
        }

        state.min_size = desktop.min;
        state.max_size = desktop.max;
        state.size = desktop.clamp_size(state.size);
        state.resizable = true;
        state.mode = target;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    fn switch_desktop<B: WindowBackend>(
        backend: &mut B,
        state: &mut WindowState,
        handle: NativeHandle,
        target: WindowMode,
    ) -> WindowResult<()> {
        let desktop = SizeBounds::new(Size::MIN, backend.desktop_resolution()?);
        let previous = SizeBounds::of(state);

        backend.set_size_limits(handle, desktop.min, desktop.max);
        if let Err(err) = backend.set_fullscreen(handle, target) {
            log::error!("Switching to {target:?} mode failed: {err}");
            backend.set_size_limits(handle, previous.min, previous.max);
            return Err(err.into());
        }

        state.min_size = desktop.min;
        state.max_size = desktop.max;
        state.size = desktop.clamp_size(state.size);
        state.mode = target;
        Ok(())
    }

    fn leave_desktop<B: WindowBackend>(
        &mut self,
        backend: &mut B,
        state: &mut WindowState,
        handle: NativeHandle,
    ) -> WindowResult<()> {
        backend.set_fullscreen(handle, WindowMode::Windowed)?;

        let snapshot = self.snapshot.take().unwrap_or(WindowedSnapshot {
            min_size: Size::MIN,
            max_size: Size::MAX,
            size: state.size,
            resizable: state.resizable,
        });

        let (max_w, max_h) = snapshot.max_size.to_native();
        geometry::set_bounds(BoundKind::Max, max_w, max_h, state);
        let (min_w, min_h) = snapshot.min_size.to_native();
        geometry::set_bounds(BoundKind::Min, min_w, min_h, state);
        backend.set_size_limits(handle, state.min_size, state.max_size);

        if state.resizable != snapshot.resizable {
            backend.set_resizable(handle, snapshot.resizable);
        }
        state.resizable = snapshot.resizable;

        state.size = SizeBounds::of(state).clamp_size(snapshot.size);
        backend.set_window_size(handle, state.size);
        state.mode = WindowMode::Windowed;
        Ok(())
    }
}

/// Widen live bounds to `[1x1, desktop]` without touching the mode
pub(crate) fn unbound<B: WindowBackend>(
    backend: &mut B,
    state: &mut WindowState,
) -> WindowResult<()> {
    let handle = state.handle.ok_or(WindowError::NotRunning)?;
    let (width, height) = backend.desktop_resolution()?.to_native();

    geometry::set_bounds(BoundKind::Max, width, height, state);
    geometry::set_bounds(BoundKind::Min, 1, 1, state);
    backend.set_size_limits(handle, state.min_size, state.max_size);
    backend.set_window_size(handle, state.size);
    Ok(())
}
