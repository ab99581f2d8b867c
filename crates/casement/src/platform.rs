//! Shared ownership of the native windowing subsystem
//!
//! A [`Platform`] is the explicit initialization context every
//! [`Window`](crate::window::Window) is built from. Cloning it shares the same
//! backend; the backend is shut down exactly once, when the last clone goes
//! away. There are no global "initialized" flags and no exit hooks.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use crate::backend::WindowBackend;

struct PlatformInner<B: WindowBackend> {
    backend: RefCell<B>,
}

impl<B: WindowBackend> Drop for PlatformInner<B> {
    fn drop(&mut self) {
        log::debug!("Last platform owner released, shutting down backend");
        self.backend.get_mut().shutdown();
    }
}

/// Reference-counted owner of a native backend
///
/// Single-threaded: windows and their event pump live on the thread that
/// created the platform. Use a [`WindowProxy`](crate::window::WindowProxy)
/// to reach a window from other threads.
pub struct Platform<B: WindowBackend> {
    inner: Rc<PlatformInner<B>>,
}

impl<B: WindowBackend> Platform<B> {
    /// Take ownership of an initialized backend
    pub fn new(backend: B) -> Self {
        Self {
            inner: Rc::new(PlatformInner {
                backend: RefCell::new(backend),
            }),
        }
    }

    /// Number of live owners (platform clones and the windows holding one)
    pub fn owners(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Run a closure with the backend borrowed mutably
    ///
    /// # Panics
    /// Panics if called while the backend is already borrowed, which only
    /// happens when nested inside another `with_backend` call.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        f(&mut self.inner.backend.borrow_mut())
    }

    /// Borrow the backend for a single call; never held across callbacks
    pub(crate) fn backend(&self) -> RefMut<'_, B> {
        self.inner.backend.borrow_mut()
    }
}

impl<B: WindowBackend> Clone for Platform<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

#[cfg(feature = "glfw")]
impl Platform<crate::backend::glfw::GlfwBackend> {
    /// Initialize GLFW and wrap it in a platform
    pub fn glfw() -> Result<Self, crate::error::BackendError> {
        crate::backend::glfw::GlfwBackend::new().map(Self::new)
    }
}

impl Platform<crate::backend::headless::HeadlessBackend> {
    /// Platform over a fresh in-memory backend
    pub fn headless() -> Self {
        Self::new(crate::backend::headless::HeadlessBackend::new())
    }
}
