//! Shared integration test helpers for cellshape.
//!
//! Fonts and shapers here are in-memory doubles, so results do not depend on
//! the fonts installed on the machine running the tests.
//!
//! ```ignore
//! mod common;
//! use common::{GridShaper, measurer, slot_lock};
//! ```

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cellshape::{ClusterWidth, WidthMapperRegistry};
use cellshape_fonts::{
    FontHandle, FontProvider, FontResolutionError, FontResolver, FontSource, RunAttributes,
    ShapeCache, ShapeError, ShapedGlyph, Shaper, ShapingEngine,
};
use parking_lot::{Mutex, MutexGuard};

/// Serializes tests that bind the process-wide host width slot.
static SLOT_LOCK: Mutex<()> = Mutex::new(());

pub fn slot_lock() -> MutexGuard<'static, ()> {
    let guard = SLOT_LOCK.lock();
    // A previous test may have failed while installed
    cellshape::uninstall();
    guard
}

/// Provider resolving every family to the same empty in-memory font.
pub struct AnyFont;

impl FontProvider for AnyFont {
    fn locate(&self, family: &str) -> Option<FontSource> {
        Some(FontSource::Memory {
            key: format!("mem:{family}"),
            data: Arc::new(Vec::new()),
            index: 0,
        })
    }

    fn load(&self, source: &FontSource) -> Result<FontHandle, FontResolutionError> {
        Ok(FontHandle::new(source.key(), Arc::new(Vec::new()), 0))
    }

    fn enumerate(&self, _script: Option<&str>) -> Vec<String> {
        vec!["Any".to_string()]
    }
}

/// Provider with no fonts at all.
pub struct NoFonts;

impl FontProvider for NoFonts {
    fn locate(&self, _family: &str) -> Option<FontSource> {
        None
    }

    fn load(&self, source: &FontSource) -> Result<FontHandle, FontResolutionError> {
        Err(FontResolutionError::Load {
            source_key: source.key(),
            reason: "no fonts".to_string(),
        })
    }

    fn enumerate(&self, _script: Option<&str>) -> Vec<String> {
        Vec::new()
    }
}

/// One glyph per character with a fixed advance for ASCII and another for
/// everything else. Counts shaping calls.
pub struct GridShaper {
    pub ascii_px: i32,
    pub other_px: i32,
    pub calls: AtomicUsize,
}

impl GridShaper {
    pub fn new(ascii_px: i32, other_px: i32) -> Self {
        Self {
            ascii_px,
            other_px,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Shaper for GridShaper {
    fn shape(
        &self,
        _font: &FontHandle,
        text: &str,
        _attrs: &RunAttributes<'_>,
    ) -> Result<Vec<ShapedGlyph>, ShapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(text
            .char_indices()
            .map(|(offset, ch)| ShapedGlyph {
                glyph_id: ch as u32,
                cluster: offset as u32,
                x_advance: if ch.is_ascii() {
                    self.ascii_px
                } else {
                    self.other_px
                },
            })
            .collect())
    }
}

/// Shaper that fails every run.
pub struct RejectingShaper;

impl Shaper for RejectingShaper {
    fn shape(
        &self,
        font: &FontHandle,
        _text: &str,
        _attrs: &RunAttributes<'_>,
    ) -> Result<Vec<ShapedGlyph>, ShapeError> {
        Err(ShapeError::ShapingFailure {
            font: font.key().to_string(),
            reason: "rejected".to_string(),
        })
    }
}

pub fn engine(provider: Arc<dyn FontProvider>, shaper: Arc<dyn Shaper>) -> ShapingEngine {
    ShapingEngine::new(Arc::new(FontResolver::new(provider)), shaper)
}

/// An 8px-cell measurer over `shaper` with any font available.
pub fn measurer(shaper: Arc<dyn Shaper>, registry: Arc<WidthMapperRegistry>) -> Arc<ClusterWidth> {
    measurer_with(Arc::new(AnyFont), shaper, registry)
}

pub fn measurer_with(
    provider: Arc<dyn FontProvider>,
    shaper: Arc<dyn Shaper>,
    registry: Arc<WidthMapperRegistry>,
) -> Arc<ClusterWidth> {
    let shapes = Arc::new(ShapeCache::new(engine(provider, shaper), 64));
    Arc::new(ClusterWidth::new(shapes, registry, 8, 64).expect("valid cell width"))
}
