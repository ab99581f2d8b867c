//! Error types for window management

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Failure reported by the native windowing backend.
///
/// Carries the name of the backend operation that failed and the backend's own
/// error text, so callers see exactly what the platform said.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct BackendError {
    /// Backend operation that failed (e.g. `"set_fullscreen"`)
    pub operation: &'static str,
    /// Error text reported by the backend
    pub message: String,
}

impl BackendError {
    /// Create a backend error for the given operation
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// The operation needs a live native window and none exists
    #[error("no window is running")]
    NotRunning,

    /// `show()` was called while this instance already owns a native window
    #[error("window is already running")]
    AlreadyRunning,

    /// `show()` was called on an instance whose window has already been closed
    #[error("window has already been closed and cannot be restarted")]
    Finished,

    /// The operation needs an OpenGL context and the window was created without one
    #[error("window has no OpenGL context")]
    NoGlContext,

    /// A native backend call failed
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// An existing icon file could not be decoded
    #[error("failed to load icon {path:?}: {source}")]
    Icon {
        /// Path of the icon file
        path: PathBuf,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },

    /// Configuration could not be loaded
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for window operations
pub type WindowResult<T> = Result<T, WindowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_carries_backend_text() {
        let err = WindowError::from(BackendError::new("desktop_resolution", "no display"));
        assert_eq!(
            err.to_string(),
            "backend error: desktop_resolution failed: no display"
        );
        assert!(matches!(err, WindowError::Backend(ref e) if e.message == "no display"));
    }
}
