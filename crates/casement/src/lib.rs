//! # Casement
//!
//! A desktop window abstraction over a native windowing backend.
//!
//! ## Features
//!
//! - **Typed Events**: one polled native event stream turned into a typed
//!   [`Event`] sum type with per-type subscriptions
//! - **Cached State**: size, bounds, position, mode and focus are mirrored in
//!   a [`WindowState`] so queries never round-trip to the platform
//! - **Clamped Geometry**: sizes stay within `[min, max]`, positions and
//!   opacity are clamped instead of rejected
//! - **Display Modes**: windowed, borderless and fullscreen, with the user's
//!   bounds restored exactly on return to windowed mode
//! - **OpenGL Contexts**: opt-in context creation with vsync control and
//!   buffer swaps
//! - **Pluggable Backends**: GLFW for real windows, an in-memory backend for
//!   tests and tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use casement::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let platform = Platform::glfw()?;
//!     let mut window = Window::new(&platform, "Hello", 800, 600, WindowFlags::RESIZABLE);
//!
//!     window.on_key_down(|window, _| {
//!         let _ = window.change_window_mode(WindowMode::Borderless);
//!     });
//!     window.on_closed(|window| log::info!("Closed at {:?}", window.size()));
//!
//!     window.show()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod foundation;
pub mod icon;
pub mod platform;
pub mod window;

pub use error::{BackendError, WindowError, WindowResult};
pub use events::{Event, EventCategory, EventType, Subscription};
pub use platform::Platform;
pub use window::{Position, Size, Window, WindowMode, WindowState};

/// Common imports for window users
pub mod prelude {
    pub use crate::{
        backend::{headless::HeadlessBackend, GlProfile, GlSettings, VSync, WindowBackend, WindowFlags},
        config::{Config, WindowConfig},
        events::{Event, EventCategory, EventType, Subscription},
        window::{Position, Size, Window, WindowCommand, WindowMode, WindowProxy, WindowState},
        BackendError, Platform, WindowError, WindowResult,
    };

    #[cfg(feature = "glfw")]
    pub use crate::backend::glfw::GlfwBackend;
}
