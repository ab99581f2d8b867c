use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Config;
use crate::backend::{GlSettings, WindowFlags};
use crate::window::{Position, WindowMode};

/// A width/height pair as written in configuration files
///
/// Kept signed so out-of-range values survive loading and get clamped when
/// applied, the same way runtime geometry requests are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeSetting {
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl SizeSetting {
    /// Create a size setting
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// # Window Configuration
///
/// Everything needed to create a window and bring it into its initial state.
/// Fields missing from a file take their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Requested width
    pub width: i32,
    /// Requested height
    pub height: i32,
    /// Minimum size applied after creation
    pub min_size: Option<SizeSetting>,
    /// Maximum size applied after creation
    pub max_size: Option<SizeSetting>,
    /// Initial position; the backend picks one when unset
    pub position: Option<Position>,
    /// Whether the user may resize the window
    pub resizable: bool,
    /// Create the window without showing it
    pub hidden: bool,
    /// Initial display mode
    pub mode: WindowMode,
    /// Initial opacity, clamped to `[0, 1]`
    pub opacity: f32,
    /// Icon file (BMP or PNG); ignored if it does not exist
    pub icon: Option<PathBuf>,
    /// OpenGL context to create with the window, if any
    pub gl: Option<GlSettings>,
    /// Default log filter used by [`crate::foundation::logging::init_with_level`]
    pub log_level: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "casement".to_string(),
            width: 800,
            height: 600,
            min_size: None,
            max_size: None,
            position: None,
            resizable: true,
            hidden: false,
            mode: WindowMode::Windowed,
            opacity: 1.0,
            icon: None,
            gl: None,
            log_level: "info".to_string(),
        }
    }
}

impl WindowConfig {
    /// Create a configuration with the given title and size
    pub fn new(title: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    /// Set the minimum size
    pub fn with_min_size(mut self, width: i32, height: i32) -> Self {
        self.min_size = Some(SizeSetting::new(width, height));
        self
    }

    /// Set the maximum size
    pub fn with_max_size(mut self, width: i32, height: i32) -> Self {
        self.max_size = Some(SizeSetting::new(width, height));
        self
    }

    /// Set the initial position
    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    /// Set whether the window is resizable
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Create the window hidden
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Set the initial display mode
    pub fn with_mode(mut self, mode: WindowMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the initial opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the icon path
    pub fn with_icon(mut self, path: impl Into<PathBuf>) -> Self {
        self.icon = Some(path.into());
        self
    }

    /// Create an OpenGL context with the window
    pub fn with_gl(mut self, settings: GlSettings) -> Self {
        self.gl = Some(settings);
        self
    }

    /// Set the default log filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Creation flags implied by this configuration
    pub fn flags(&self) -> WindowFlags {
        let mut flags = WindowFlags::empty();
        flags.set(WindowFlags::RESIZABLE, self.resizable);
        flags.set(WindowFlags::HIDDEN, self.hidden);
        flags.set(WindowFlags::BORDERLESS, self.mode == WindowMode::Borderless);
        flags.set(WindowFlags::FULLSCREEN, self.mode == WindowMode::Fullscreen);
        flags.set(WindowFlags::OPENGL, self.gl.is_some());
        flags
    }

    /// Check for values that cannot be clamped into something meaningful
    ///
    /// Geometry and opacity are clamped at runtime and never rejected here.
    pub fn validate(&self) -> Result<(), String> {
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(format!("Unknown log level: {}", self.log_level));
        }
        if self.opacity.is_nan() {
            return Err("Opacity must be a number".to_string());
        }
        if let Some(gl) = &self.gl {
            if gl.major_version == 0 {
                return Err(format!(
                    "OpenGL version {}.{} does not exist",
                    gl.major_version, gl.minor_version
                ));
            }
        }
        Ok(())
    }
}

impl Config for WindowConfig {}
