//! Pixel-to-cell conversion and the width mapper registry.
//!
//! [`px_to_cells`] turns a shaped pixel advance into terminal cells. Before a
//! converted width is reported, the [`WidthMapperRegistry`] gives each
//! registered [`WidthMapper`] a chance to override it; the first mapper that
//! returns `Some` wins.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::error::CellshapeError;

/// Width of one terminal cell in pixels when nothing else is configured.
pub const DEFAULT_CELL_WIDTH_PX: i32 = 8;

/// Convert a pixel advance into a whole number of cells, rounding up.
///
/// Non-positive advances occupy no cells.
///
/// # Errors
/// [`CellshapeError::InvalidConfiguration`] when `cell_width_px` is not positive.
pub fn px_to_cells(advance_px: i32, cell_width_px: i32) -> Result<usize, CellshapeError> {
    if cell_width_px <= 0 {
        return Err(CellshapeError::InvalidConfiguration(format!(
            "cell width must be positive, got {cell_width_px}px"
        )));
    }
    if advance_px <= 0 {
        return Ok(0);
    }
    Ok((advance_px as u32).div_ceil(cell_width_px as u32) as usize)
}

/// A named override for the width of a piece of text.
///
/// `default_width` is the width computed from shaping; returning `None` defers
/// to the next mapper (or to `default_width` when none is left).
pub trait WidthMapper: Send + Sync {
    fn map_width(&self, text: &str, default_width: usize) -> Option<usize>;
}

impl<F> WidthMapper for F
where
    F: Fn(&str, usize) -> Option<usize> + Send + Sync,
{
    fn map_width(&self, text: &str, default_width: usize) -> Option<usize> {
        self(text, default_width)
    }
}

/// Counts East Asian wide and fullwidth characters as two cells.
///
/// Only answers for text that contains at least one such character. Not
/// registered by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct EastAsianWidthMapper;

impl WidthMapper for EastAsianWidthMapper {
    fn map_width(&self, text: &str, _default_width: usize) -> Option<usize> {
        text.chars()
            .any(|c| c.width() == Some(2))
            .then(|| text.width())
    }
}

type NamedMapper = (String, Arc<dyn WidthMapper>);

/// Ordered set of named width mappers.
///
/// Registration order is consultation order. Re-registering a name replaces
/// the mapper in its original position. Every change bumps
/// [`generation`](Self::generation) so callers caching mapped widths can tell
/// their entries are stale.
pub struct WidthMapperRegistry {
    mappers: RwLock<Vec<NamedMapper>>,
    generation: AtomicU64,
}

impl fmt::Debug for WidthMapperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidthMapperRegistry")
            .field("names", &self.names())
            .field("generation", &self.generation())
            .finish()
    }
}

impl Default for WidthMapperRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WidthMapperRegistry {
    pub fn new() -> Self {
        Self {
            mappers: RwLock::new(Vec::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Add or replace the mapper called `name`.
    ///
    /// # Errors
    /// [`CellshapeError::InvalidConfiguration`] for an empty name.
    pub fn register(
        &self,
        name: impl Into<String>,
        mapper: impl WidthMapper + 'static,
    ) -> Result<(), CellshapeError> {
        self.register_arc(name, Arc::new(mapper))
    }

    /// [`register`](Self::register) for an already shared mapper.
    pub fn register_arc(
        &self,
        name: impl Into<String>,
        mapper: Arc<dyn WidthMapper>,
    ) -> Result<(), CellshapeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CellshapeError::InvalidConfiguration(
                "width mapper name must not be empty".to_string(),
            ));
        }

        let mut mappers = self.mappers.write();
        match mappers.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => {
                log::debug!("Replacing width mapper '{}'", name);
                slot.1 = mapper;
            }
            None => {
                log::debug!("Registering width mapper '{}'", name);
                mappers.push((name, mapper));
            }
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Remove the mapper called `name`; returns whether one was registered.
    pub fn unregister(&self, name: &str) -> bool {
        let mut mappers = self.mappers.write();
        let before = mappers.len();
        mappers.retain(|(existing, _)| existing != name);
        let removed = mappers.len() != before;
        if removed {
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
        removed
    }

    /// Names in consultation order.
    pub fn names(&self) -> Vec<String> {
        self.mappers
            .read()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.mappers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.read().is_empty()
    }

    /// Counter bumped on every registration change.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// First override for `text` in registration order, else `default_width`.
    pub fn get_cell_width(&self, text: &str, default_width: usize) -> usize {
        // Mappers run without the lock held so they may touch the registry.
        let snapshot: Vec<Arc<dyn WidthMapper>> = self
            .mappers
            .read()
            .iter()
            .map(|(_, mapper)| Arc::clone(mapper))
            .collect();

        snapshot
            .iter()
            .find_map(|mapper| mapper.map_width(text, default_width))
            .unwrap_or(default_width)
    }
}

static GLOBAL_REGISTRY: LazyLock<Arc<WidthMapperRegistry>> =
    LazyLock::new(|| Arc::new(WidthMapperRegistry::new()));

/// The process-wide registry consulted by the installed width override.
pub fn global_registry() -> Arc<WidthMapperRegistry> {
    Arc::clone(&GLOBAL_REGISTRY)
}
