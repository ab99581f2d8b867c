//! OpenGL context settings
//!
//! A context is requested at creation time with [`WindowFlags::OPENGL`]
//! (see [`crate::backend::WindowFlags`]); backends that need context
//! attributes before the window exists (GLFW does) read them from the
//! [`WindowDescriptor`](crate::backend::WindowDescriptor).

use serde::{Deserialize, Serialize};

/// Vertical synchronization state of a context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VSync {
    /// Swap on vertical blank
    Enabled,
    /// Swap immediately
    Disabled,
    /// No context yet, or the driver default was left alone
    #[default]
    Unknown,
}

impl VSync {
    /// Swap interval to request from the driver; `None` keeps its default
    pub const fn swap_interval(self) -> Option<u32> {
        match self {
            Self::Enabled => Some(1),
            Self::Disabled => Some(0),
            Self::Unknown => None,
        }
    }
}

/// OpenGL profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GlProfile {
    /// Core profile, no deprecated functionality
    #[default]
    Core,
    /// Compatibility profile
    Compatibility,
}

/// Attributes of the OpenGL context created with a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlSettings {
    /// Initial vertical synchronization
    pub vsync: VSync,
    /// Context major version
    pub major_version: u32,
    /// Context minor version
    pub minor_version: u32,
    /// Depth buffer bits
    pub depth_bits: u32,
    /// Stencil buffer bits
    pub stencil_bits: u32,
    /// Double buffering
    pub double_buffer: bool,
    /// Multisample count; 0 disables multisampling
    pub samples: u32,
    /// sRGB-capable framebuffer
    pub srgb: bool,
    /// Context profile
    pub profile: GlProfile,
}

impl Default for GlSettings {
    fn default() -> Self {
        Self {
            vsync: VSync::Enabled,
            major_version: 3,
            minor_version: 3,
            depth_bits: 24,
            stencil_bits: 8,
            double_buffer: true,
            samples: 0,
            srgb: false,
            profile: GlProfile::Core,
        }
    }
}

impl GlSettings {
    /// Set the initial vertical synchronization
    pub fn with_vsync(mut self, vsync: VSync) -> Self {
        self.vsync = vsync;
        self
    }

    /// Set the context version
    pub fn with_version(mut self, major: u32, minor: u32) -> Self {
        self.major_version = major;
        self.minor_version = minor;
        self
    }

    /// Set depth and stencil buffer sizes
    pub fn with_buffers(mut self, depth_bits: u32, stencil_bits: u32) -> Self {
        self.depth_bits = depth_bits;
        self.stencil_bits = stencil_bits;
        self
    }

    /// Set the multisample count
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    /// Set the context profile
    pub fn with_profile(mut self, profile: GlProfile) -> Self {
        self.profile = profile;
        self
    }
}
