//! Font resolution and text shaping for cellshape.
//!
//! This crate provides:
//! - Font resolution with system font discovery and fallback chains
//! - Script-specific font preferences for complex scripts
//! - Script run segmentation for mixed-script text
//! - HarfBuzz-based text shaping via rustybuzz, merged into glyph clusters
//! - A bounded LRU cache of shaping results
//!
//! # Architecture
//!
//! The `FontResolver` maps a path, family name or script tag to a loaded font,
//! walking a priority-ordered chain:
//! 1. Explicit font path
//! 2. Explicit family name
//! 3. Script-specific families
//! 4. Generic fallback families
//!
//! The `ShapingEngine` normalizes text, splits it into script runs, shapes each
//! run and merges the glyphs into `Cluster`s. `ShapeCache` memoizes the result.

pub mod error;
pub mod font_resolver;
pub mod script;
pub mod shape_cache;
pub mod text_shaper;

// Re-export main types for convenience
pub use error::{FontResolutionError, ShapeError};
pub use font_resolver::{
    FALLBACK_FAMILIES, FontHandle, FontProvider, FontResolver, FontSource, SystemFontProvider,
};
pub use script::{GENERIC_SCRIPT, ScriptRun, segment_by_script};
pub use shape_cache::{DEFAULT_SHAPE_CACHE_SIZE, ShapeCache};
pub use text_shaper::{
    Cluster, DEFAULT_LANGUAGE, Direction, RunAttributes, RustybuzzShaper, ShapeRequest,
    ShapedGlyph, Shaper, ShapingEngine, ShapingOptions, merge_clusters,
};
