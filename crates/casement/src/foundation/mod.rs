//! Foundation module - shared utilities
//!
//! Currently only logging setup lives here.

pub mod logging;
