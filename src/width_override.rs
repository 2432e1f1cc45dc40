//! Cluster-aware replacement for the host width slot.
//!
//! [`ClusterWidth`] measures text by shaping it, summing cluster advances,
//! converting pixels to cells and letting the mapper registry override the
//! result. [`install`] binds the host slot to it; [`uninstall`] puts back
//! exactly the binding that was there before.
//!
//! Once installed, pure ASCII text still goes to the previous binding, and any
//! measurement failure degrades to the character count instead of an error.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use cellshape_fonts::{DEFAULT_LANGUAGE, ShapeCache, ShapeRequest};
use lru::LruCache;
use parking_lot::Mutex;

use crate::error::CellshapeError;
use crate::host::{self, WidthBinding, WidthStrategy};
use crate::measure::{WidthMapperRegistry, px_to_cells};

/// Default number of cached widths.
pub const DEFAULT_WIDTH_CACHE_SIZE: usize = 1024;

/// Name of the binding [`install`] puts in the host slot.
pub const INSTALLED_BINDING_NAME: &str = "cellshape";

#[derive(Debug, Clone, Copy)]
struct CachedWidth {
    /// Registry generation the width was mapped under
    generation: u64,
    cells: usize,
}

/// Shaping-based width measurement with its own result cache.
pub struct ClusterWidth {
    shapes: Arc<ShapeCache>,
    registry: Arc<WidthMapperRegistry>,
    cell_width_px: i32,
    language: String,
    widths: Mutex<LruCache<String, CachedWidth>>,
}

impl fmt::Debug for ClusterWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterWidth")
            .field("cell_width_px", &self.cell_width_px)
            .field("language", &self.language)
            .field("cached", &self.widths.lock().len())
            .finish_non_exhaustive()
    }
}

impl ClusterWidth {
    /// Build a measurer; a zero `capacity` is raised to one entry.
    ///
    /// # Errors
    /// [`CellshapeError::InvalidConfiguration`] when `cell_width_px` is not positive.
    pub fn new(
        shapes: Arc<ShapeCache>,
        registry: Arc<WidthMapperRegistry>,
        cell_width_px: i32,
        capacity: usize,
    ) -> Result<Self, CellshapeError> {
        if cell_width_px <= 0 {
            return Err(CellshapeError::InvalidConfiguration(format!(
                "cell width must be positive, got {cell_width_px}px"
            )));
        }
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            shapes,
            registry,
            cell_width_px,
            language: DEFAULT_LANGUAGE.to_string(),
            widths: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Shape with this language tag instead of the default.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn cell_width_px(&self) -> i32 {
        self.cell_width_px
    }

    pub fn registry(&self) -> &Arc<WidthMapperRegistry> {
        &self.registry
    }

    pub fn shape_cache(&self) -> &Arc<ShapeCache> {
        &self.shapes
    }

    /// Cell width of `text` from its shaped advance and the mapper registry.
    ///
    /// # Errors
    /// Propagates font resolution and shaping failures.
    pub fn measure(&self, text: &str) -> Result<usize, CellshapeError> {
        let generation = self.registry.generation();
        if let Some(hit) = self.widths.lock().get(text)
            && hit.generation == generation
        {
            return Ok(hit.cells);
        }

        let request = ShapeRequest::new(text).with_language(self.language.as_str());
        let clusters = self.shapes.get_or_shape(&request)?;
        let total_px: i64 = clusters.iter().map(|c| i64::from(c.advance_px)).sum();
        let total_px = total_px.clamp(0, i64::from(i32::MAX)) as i32;

        let cells = px_to_cells(total_px, self.cell_width_px)?;
        let cells = self.registry.get_cell_width(text, cells);

        self.widths
            .lock()
            .put(text.to_string(), CachedWidth { generation, cells });
        Ok(cells)
    }

    /// Number of cached widths, stale generations included.
    pub fn cached_widths(&self) -> usize {
        self.widths.lock().len()
    }

    pub fn clear(&self) {
        self.widths.lock().clear();
    }
}

impl WidthStrategy for ClusterWidth {
    fn cell_len(&self, text: &str) -> usize {
        self.measure(text).unwrap_or_else(|e| {
            log::error!("Width measurement failed, using character count: {e}");
            text.chars().count()
        })
    }
}

/// The strategy bound into the host slot while installed.
struct InstalledWidth {
    original: Arc<WidthBinding>,
    measurer: Arc<ClusterWidth>,
}

impl WidthStrategy for InstalledWidth {
    fn cell_len(&self, text: &str) -> usize {
        if text.is_ascii() {
            return self.original.cell_len(text);
        }
        self.measurer.cell_len(text)
    }
}

struct InstallState {
    original: Arc<WidthBinding>,
}

static STATE: Mutex<Option<InstallState>> = Mutex::new(None);

/// Bind the host slot to the global pipeline's measurer.
///
/// Does nothing when already installed.
///
/// # Errors
/// [`CellshapeError::InvalidConfiguration`] when the global pipeline was
/// configured with an unusable cell width.
pub fn install() -> Result<(), CellshapeError> {
    let mut state = STATE.lock();
    if state.is_some() {
        log::debug!("Width override already installed");
        return Ok(());
    }
    let measurer = crate::pipeline::measurer()?;
    *state = Some(bind(measurer));
    Ok(())
}

/// Bind the host slot to `measurer`, replacing any measurer installed earlier.
///
/// The binding restored by [`uninstall`] is still the one present before the
/// first install.
pub fn install_with(measurer: Arc<ClusterWidth>) {
    let mut state = STATE.lock();
    match state.as_ref() {
        Some(existing) => {
            let binding = installed_binding(Arc::clone(&existing.original), measurer);
            host::replace(binding);
        }
        None => *state = Some(bind(measurer)),
    }
}

/// Restore the binding that was in the host slot before [`install`].
///
/// Safe to call when not installed.
pub fn uninstall() {
    if let Some(previous) = STATE.lock().take() {
        host::replace(previous.original);
        log::info!("Width override uninstalled");
    }
}

pub fn is_installed() -> bool {
    STATE.lock().is_some()
}

fn bind(measurer: Arc<ClusterWidth>) -> InstallState {
    let original = host::current();
    host::replace(installed_binding(Arc::clone(&original), measurer));
    log::info!(
        "Width override installed (previous binding '{}')",
        original.name()
    );
    InstallState { original }
}

fn installed_binding(original: Arc<WidthBinding>, measurer: Arc<ClusterWidth>) -> Arc<WidthBinding> {
    Arc::new(WidthBinding::new(
        INSTALLED_BINDING_NAME,
        Arc::new(InstalledWidth { original, measurer }),
    ))
}
