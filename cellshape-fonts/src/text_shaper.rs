//! Text shaping and glyph-to-cluster mapping.
//!
//! # Architecture
//!
//! The shaping pipeline:
//! 1. NFC normalization (unicode-normalization)
//! 2. Script run segmentation when no script is given (unicode-script)
//! 3. Font resolution per run, script-specific first
//! 4. Text shaping through a [`Shaper`] (rustybuzz by default)
//! 5. Merging the glyph stream into [`Cluster`]s with pixel advances
//!
//! Results are cached one level up by [`ShapeCache`](crate::ShapeCache).
//!
//! # Usage
//!
//! ```ignore
//! let engine = ShapingEngine::system(ShapingOptions::default());
//! let clusters = engine.shape(&ShapeRequest::new("తెలుగు").with_script(Some("telu")))?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use rustybuzz::{BufferClusterLevel, Face, Feature, Language, Script, UnicodeBuffer};
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{FontResolutionError, ShapeError};
use crate::font_resolver::{FontHandle, FontResolver};
use crate::script::{ScriptRun, segment_by_script};

/// Language used when the caller does not give one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Horizontal text direction.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ltr" => Ok(Direction::Ltr),
            "rtl" => Ok(Direction::Rtl),
            other => Err(format!("unknown direction '{other}' (expected ltr or rtl)")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        })
    }
}

/// A run of source text rendered as one visual unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Source text covered by this cluster (NFC-normalized)
    pub text: String,
    /// Total horizontal advance in pixels, never negative
    pub advance_px: i32,
    /// Byte offset of `text` within the normalized input
    pub offset: usize,
}

/// A single shaped glyph as reported by a [`Shaper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapedGlyph {
    /// Glyph ID from the font
    pub glyph_id: u32,

    /// Byte offset of the source cluster this glyph belongs to
    pub cluster: u32,

    /// Horizontal advance in pixels
    pub x_advance: i32,
}

/// Attributes of one homogeneous run handed to a [`Shaper`].
#[derive(Debug, Clone, Copy)]
pub struct RunAttributes<'a> {
    pub direction: Direction,
    /// Lowercase ISO 15924 script tag
    pub script: &'a str,
    /// BCP 47 language tag
    pub language: &'a str,
}

/// The shaping capability: turns text in one font into a glyph stream.
///
/// Glyphs must be returned in visual output order; `cluster` values are byte
/// offsets into `text`.
pub trait Shaper: Send + Sync {
    fn shape(
        &self,
        font: &FontHandle,
        text: &str,
        attrs: &RunAttributes<'_>,
    ) -> Result<Vec<ShapedGlyph>, ShapeError>;
}

/// Options for text shaping
#[derive(Debug, Clone)]
pub struct ShapingOptions {
    /// Enable standard ligatures (fi, fl, etc.)
    pub enable_ligatures: bool,

    /// Enable kerning adjustments
    pub enable_kerning: bool,

    /// Enable contextual alternates
    pub enable_contextual_alternates: bool,

    /// Pixel size of one em; font-unit advances are scaled by `font_size_px / units_per_em`
    pub font_size_px: f32,
}

impl Default for ShapingOptions {
    fn default() -> Self {
        Self {
            enable_ligatures: true,
            enable_kerning: true,
            enable_contextual_alternates: true,
            font_size_px: 13.0,
        }
    }
}

impl ShapingOptions {
    /// OpenType feature list for these options.
    fn features(&self) -> Vec<Feature> {
        let mut tags = Vec::new();

        // Standard and contextual ligatures
        if self.enable_ligatures {
            tags.extend(["liga", "clig"]);
        }
        if self.enable_kerning {
            tags.push("kern");
        }
        if self.enable_contextual_alternates {
            tags.push("calt");
        }
        // Glyph composition and localized forms are required for complex scripts
        tags.extend(["ccmp", "locl"]);

        tags.into_iter()
            .filter_map(|tag| Feature::from_str(tag).ok())
            .collect()
    }
}

/// [`Shaper`] backed by HarfBuzz via rustybuzz.
#[derive(Debug, Clone, Default)]
pub struct RustybuzzShaper {
    options: ShapingOptions,
}

impl RustybuzzShaper {
    pub fn new(options: ShapingOptions) -> Self {
        Self { options }
    }
}

impl Shaper for RustybuzzShaper {
    fn shape(
        &self,
        font: &FontHandle,
        text: &str,
        attrs: &RunAttributes<'_>,
    ) -> Result<Vec<ShapedGlyph>, ShapeError> {
        let failure = |reason: &str| ShapeError::ShapingFailure {
            font: font.key().to_string(),
            reason: reason.to_string(),
        };

        let face = Face::from_slice(font.data(), font.face_index())
            .ok_or_else(|| failure("font data is not a valid face"))?;
        let units_per_em = face.units_per_em() as f32;
        if units_per_em <= 0.0 {
            return Err(failure("font reports zero units per em"));
        }
        let scale = self.options.font_size_px / units_per_em;

        let mut unicode_buffer = UnicodeBuffer::new();
        unicode_buffer.push_str(text);
        unicode_buffer.set_cluster_level(BufferClusterLevel::MonotoneGraphemes);
        unicode_buffer.set_direction(match attrs.direction {
            Direction::Ltr => rustybuzz::Direction::LeftToRight,
            Direction::Rtl => rustybuzz::Direction::RightToLeft,
        });

        // Convert 4-letter script code to Script (e.g., "arab", "latn", "deva")
        if let Ok(script) = Script::from_str(attrs.script) {
            unicode_buffer.set_script(script);
        }
        if let Ok(lang) = Language::from_str(attrs.language) {
            unicode_buffer.set_language(lang);
        }

        let glyph_buffer = rustybuzz::shape(&face, &self.options.features(), unicode_buffer);

        Ok(glyph_buffer
            .glyph_infos()
            .iter()
            .zip(glyph_buffer.glyph_positions())
            .map(|(info, pos)| ShapedGlyph {
                glyph_id: info.glyph_id,
                cluster: info.cluster,
                x_advance: (pos.x_advance as f32 * scale).round() as i32,
            })
            .collect())
    }
}

/// Identifies a shaping request; also the [`ShapeCache`](crate::ShapeCache) key.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct ShapeRequest {
    pub text: String,
    pub direction: Direction,
    /// Script tag; `None` enables per-run script detection
    pub script: Option<String>,
    pub language: String,
}

impl ShapeRequest {
    /// Left-to-right request in the default language with script detection.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            direction: Direction::Ltr,
            script: None,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_script(mut self, script: Option<&str>) -> Self {
        self.script = script.map(str::to_ascii_lowercase);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Produces cluster sequences for text.
pub struct ShapingEngine {
    resolver: Arc<FontResolver>,
    shaper: Arc<dyn Shaper>,
    font_path: Option<PathBuf>,
    font_family: Option<String>,
}

impl fmt::Debug for ShapingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapingEngine")
            .field("resolver", &self.resolver)
            .field("font_path", &self.font_path)
            .field("font_family", &self.font_family)
            .finish()
    }
}

impl ShapingEngine {
    pub fn new(resolver: Arc<FontResolver>, shaper: Arc<dyn Shaper>) -> Self {
        Self {
            resolver,
            shaper,
            font_path: None,
            font_family: None,
        }
    }

    /// Engine over system fonts and rustybuzz.
    pub fn system(options: ShapingOptions) -> Self {
        Self::new(
            Arc::new(FontResolver::system()),
            Arc::new(RustybuzzShaper::new(options)),
        )
    }

    /// Prefer this font file over any discovered font.
    pub fn with_font_path(mut self, path: Option<PathBuf>) -> Self {
        self.font_path = path;
        self
    }

    /// Prefer this family over script-specific and generic families.
    pub fn with_font_family(mut self, family: Option<String>) -> Self {
        self.font_family = family;
        self
    }

    pub fn resolver(&self) -> &Arc<FontResolver> {
        &self.resolver
    }

    /// Shape text into clusters.
    ///
    /// Empty text (after normalization) yields an empty sequence without touching
    /// fonts. Clusters of each run are in shaper output order; runs are in
    /// logical order.
    ///
    /// # Errors
    /// [`ShapeError::FontResolution`] when no font is available,
    /// [`ShapeError::ShapingFailure`] when the shaper rejects a run.
    pub fn shape(&self, request: &ShapeRequest) -> Result<Vec<Cluster>, ShapeError> {
        let text: String = request.text.nfc().collect();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let runs = match &request.script {
            Some(tag) => vec![ScriptRun {
                range: 0..text.len(),
                tag: tag.to_ascii_lowercase(),
            }],
            None => segment_by_script(&text),
        };

        let mut clusters = Vec::new();
        for run in &runs {
            let run_text = &text[run.range.clone()];
            let font = self.font_for(&run.tag)?;
            let attrs = RunAttributes {
                direction: request.direction,
                script: &run.tag,
                language: &request.language,
            };
            let glyphs = self.shaper.shape(&font, run_text, &attrs)?;
            log::trace!(
                "Shaped {} bytes of {} with {} into {} glyphs",
                run_text.len(),
                run.tag,
                font.key(),
                glyphs.len()
            );
            clusters.extend(merge_clusters(run_text, &glyphs).into_iter().map(
                |mut cluster| {
                    cluster.offset += run.range.start;
                    cluster
                },
            ));
        }
        Ok(clusters)
    }

    /// Script-specific font first, then the generic chain.
    fn font_for(&self, script: &str) -> Result<FontHandle, FontResolutionError> {
        match self.resolver.resolve(
            self.font_path.as_deref(),
            self.font_family.as_deref(),
            Some(script),
        ) {
            Ok(font) => Ok(font),
            Err(e) => {
                log::warn!("No font for script {}: {}; trying generic fonts", script, e);
                self.resolver.resolve_generic()
            }
        }
    }
}

/// Merge a glyph stream into clusters that partition `text`.
///
/// Cluster boundaries are the distinct glyph cluster offsets, snapped down to
/// grapheme boundaries. The lowest boundary owns everything from the start of
/// `text`; each boundary owns the text up to the next one, so source text that no
/// glyph references joins the preceding cluster. Glyphs of one boundary are summed
/// into a single cluster even when they are not adjacent in the stream, which
/// keeps reordered marks from duplicating text. Clusters appear in the order their
/// first glyph appears.
pub fn merge_clusters(text: &str, glyphs: &[ShapedGlyph]) -> Vec<Cluster> {
    if text.is_empty() {
        return Vec::new();
    }
    if glyphs.is_empty() {
        return vec![Cluster {
            text: text.to_string(),
            advance_px: 0,
            offset: 0,
        }];
    }

    let grapheme_starts: Vec<usize> = text.grapheme_indices(true).map(|(i, _)| i).collect();
    let snap = |offset: usize| match grapheme_starts.binary_search(&offset) {
        Ok(i) => grapheme_starts[i],
        Err(0) => 0,
        Err(i) => grapheme_starts[i - 1],
    };

    let mut boundaries: Vec<usize> = glyphs.iter().map(|g| snap(g.cluster as usize)).collect();
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut clusters: Vec<Cluster> = Vec::with_capacity(boundaries.len());
    let mut emitted: HashMap<usize, usize> = HashMap::with_capacity(boundaries.len());

    for glyph in glyphs {
        let boundary = snap(glyph.cluster as usize);
        let slot = match emitted.get(&boundary) {
            Some(&slot) => slot,
            None => {
                let rank = boundaries.partition_point(|b| *b < boundary);
                let start = if rank == 0 { 0 } else { boundary };
                let end = boundaries.get(rank + 1).copied().unwrap_or(text.len());
                clusters.push(Cluster {
                    text: text[start..end].to_string(),
                    advance_px: 0,
                    offset: start,
                });
                emitted.insert(boundary, clusters.len() - 1);
                clusters.len() - 1
            }
        };
        clusters[slot].advance_px = clusters[slot].advance_px.saturating_add(glyph.x_advance);
    }

    for cluster in &mut clusters {
        cluster.advance_px = cluster.advance_px.max(0);
    }
    clusters
}
