//! Error type for the cellshape root crate.

use cellshape_fonts::ShapeError;
use thiserror::Error;

/// Errors surfaced by width measurement and mapper registration.
#[derive(Debug, Error)]
pub enum CellshapeError {
    /// A caller-supplied setting cannot be used (zero cell width, empty mapper name, ...)
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Font resolution or shaping failed
    #[error(transparent)]
    Shape(#[from] ShapeError),
}
