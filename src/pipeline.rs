//! Process-wide shaping pipeline.
//!
//! One [`ShapeCache`] over system fonts and one [`ClusterWidth`] measurer,
//! built from [`Config`] the first time either is needed. Call [`init_global`]
//! before first use to apply a loaded configuration; later calls are ignored.

use std::sync::{Arc, OnceLock};

use cellshape_config::Config;
use cellshape_fonts::{
    Cluster, Direction, ShapeCache, ShapeError, ShapeRequest, ShapingEngine, ShapingOptions,
};

use crate::error::CellshapeError;
use crate::measure::global_registry;
use crate::width_override::ClusterWidth;

struct Pipeline {
    shapes: Arc<ShapeCache>,
    measurer: Result<Arc<ClusterWidth>, String>,
}

static PIPELINE: OnceLock<Pipeline> = OnceLock::new();

impl Pipeline {
    fn from_config(config: &Config) -> Self {
        let options = ShapingOptions {
            font_size_px: config.font_size_px,
            ..ShapingOptions::default()
        };
        let engine = ShapingEngine::system(options)
            .with_font_path(config.font_path.clone())
            .with_font_family(config.font_family.clone());
        let shapes = Arc::new(ShapeCache::new(engine, config.shape_cache_capacity));

        let measurer = ClusterWidth::new(
            Arc::clone(&shapes),
            global_registry(),
            config.cell_width_px,
            config.width_cache_capacity,
        )
        .map(|m| Arc::new(m.with_language(config.language.as_str())))
        .map_err(|e| e.to_string());

        log::debug!(
            "Pipeline initialized (cell {}px, font {}px, language '{}')",
            config.cell_width_px,
            config.font_size_px,
            config.language
        );
        Self { shapes, measurer }
    }
}

fn global() -> &'static Pipeline {
    PIPELINE.get_or_init(|| Pipeline::from_config(&Config::default()))
}

/// Configure the global pipeline; returns `false` if it already existed.
pub fn init_global(config: &Config) -> bool {
    let mut initialized = false;
    PIPELINE.get_or_init(|| {
        initialized = true;
        Pipeline::from_config(config)
    });
    if !initialized {
        log::warn!("Pipeline already initialized, ignoring new configuration");
    }
    initialized
}

/// The global shape cache.
pub fn shape_cache() -> Arc<ShapeCache> {
    Arc::clone(&global().shapes)
}

/// The global width measurer.
///
/// # Errors
/// [`CellshapeError::InvalidConfiguration`] when the pipeline was configured
/// with a non-positive cell width.
pub fn measurer() -> Result<Arc<ClusterWidth>, CellshapeError> {
    global()
        .measurer
        .clone()
        .map_err(CellshapeError::InvalidConfiguration)
}

/// Shape `text` through the global cache.
///
/// `script: None` detects script runs; the result is shared with the cache.
pub fn shape_text(
    text: &str,
    direction: Direction,
    script: Option<&str>,
    language: &str,
) -> Result<Arc<[Cluster]>, ShapeError> {
    let request = ShapeRequest::new(text)
        .with_direction(direction)
        .with_script(script)
        .with_language(language);
    global().shapes.get_or_shape(&request)
}
