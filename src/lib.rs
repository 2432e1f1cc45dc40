// Library exports for the cellshape binary and for embedding hosts
//
// # Mutex Usage Policy
//
//   - `parking_lot::Mutex`    : sync-only caches and the install state. Entries
//                               are whole immutable values (`Arc`), so a reader
//                               never observes a partially built result.
//
//   - `arc_swap::ArcSwap`     : the host width slot, read on every width query
//                               without taking a lock.
//
// Never call back into a cache while holding its lock; mapper callbacks run
// after the registry lock is released.

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod cli;
pub mod console;
pub mod error;
pub mod host;
pub mod measure;
pub mod pipeline;
pub mod render_prep;
pub mod width_override;

pub use cellshape_config::Config;
pub use cellshape_fonts::{Cluster, Direction, ShapeError};
pub use error::CellshapeError;
pub use measure::{
    DEFAULT_CELL_WIDTH_PX, EastAsianWidthMapper, WidthMapper, WidthMapperRegistry, px_to_cells,
};
pub use pipeline::shape_text;
pub use render_prep::{improve_rendering, insert_spacing, needs_complex_rendering};
pub use width_override::{ClusterWidth, install, install_with, is_installed, uninstall};

/// Register `mapper` under `name` in the process-wide registry.
///
/// # Errors
/// [`CellshapeError::InvalidConfiguration`] for an empty name.
pub fn register_width_mapper(
    name: impl Into<String>,
    mapper: impl WidthMapper + 'static,
) -> Result<(), CellshapeError> {
    measure::global_registry().register(name, mapper)
}
