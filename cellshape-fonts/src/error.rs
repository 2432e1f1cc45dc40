//! Typed errors for font resolution and shaping.

use thiserror::Error;

/// No usable font could be produced for a request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FontResolutionError {
    /// The whole fallback chain was exhausted.
    #[error("no usable font found (tried: {})", tried.join(", "))]
    NotFound { tried: Vec<String> },

    /// A font file was found but its bytes could not be read or parsed.
    #[error("failed to load font from {source_key}: {reason}")]
    Load { source_key: String, reason: String },
}

/// Errors surfaced by [`ShapingEngine`](crate::ShapingEngine) and
/// [`ShapeCache`](crate::ShapeCache).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShapeError {
    /// No font at all was available for the text.
    #[error(transparent)]
    FontResolution(#[from] FontResolutionError),

    /// The shaping capability rejected the request.
    #[error("shaping failed for font {font}: {reason}")]
    ShapingFailure { font: String, reason: String },
}
