//! Configuration struct, defaults and validation.
//!
//! # Sub-modules
//!
//! - [`persistence`]: `impl Config` methods for load/save and path resolution

pub mod persistence;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::LogLevel;

/// Configuration for width measurement and rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // ========================================================================
    // Measurement
    // ========================================================================
    /// Width of one terminal cell in pixels
    #[serde(default = "crate::defaults::cell_width_px")]
    pub cell_width_px: i32,

    /// Pixel size of one em when converting font units to pixels
    #[serde(default = "crate::defaults::font_size_px")]
    pub font_size_px: f32,

    // ========================================================================
    // Fonts
    // ========================================================================
    /// Font file to prefer over discovered fonts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,

    /// Font family to prefer over script-specific fonts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    /// Language tag passed to the shaper
    #[serde(default = "crate::defaults::language")]
    pub language: String,

    // ========================================================================
    // Caches
    // ========================================================================
    /// Maximum number of cached shaping results
    #[serde(default = "crate::defaults::shape_cache_capacity")]
    pub shape_cache_capacity: usize,

    /// Maximum number of cached width results
    #[serde(default = "crate::defaults::width_cache_capacity")]
    pub width_cache_capacity: usize,

    // ========================================================================
    // Display & Debug
    // ========================================================================
    /// Insert hair spaces after complex-script characters when printing
    #[serde(default = "crate::defaults::bool_true")]
    pub improve_display: bool,

    /// Debug log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_width_px: crate::defaults::cell_width_px(),
            font_size_px: crate::defaults::font_size_px(),
            font_path: None,
            font_family: None,
            language: crate::defaults::language(),
            shape_cache_capacity: crate::defaults::shape_cache_capacity(),
            width_cache_capacity: crate::defaults::width_cache_capacity(),
            improve_display: true,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Check field values that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_width_px <= 0 {
            return Err(ConfigError::Validation(format!(
                "cell_width_px must be positive, got {}",
                self.cell_width_px
            )));
        }
        if !(self.font_size_px.is_finite() && self.font_size_px > 0.0) {
            return Err(ConfigError::Validation(format!(
                "font_size_px must be a positive number, got {}",
                self.font_size_px
            )));
        }
        if self.shape_cache_capacity == 0 || self.width_cache_capacity == 0 {
            return Err(ConfigError::Validation(
                "cache capacities must be at least 1".to_string(),
            ));
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::Validation(
                "language must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
