//! Bounded LRU cache in front of a [`ShapingEngine`].

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::error::ShapeError;
use crate::text_shaper::{Cluster, ShapeRequest, ShapingEngine};

/// Default number of cached shaping results.
pub const DEFAULT_SHAPE_CACHE_SIZE: usize = 1024;

/// Memoizes shaping results by request.
///
/// Entries are immutable `Arc<[Cluster]>` values inserted whole, so concurrent
/// readers never observe a partially built sequence. Shaping itself runs outside
/// the lock; two threads missing on the same key may both shape it, and the last
/// insert wins with an identical value. Errors are never cached.
pub struct ShapeCache {
    engine: ShapingEngine,
    entries: Mutex<LruCache<ShapeRequest, Arc<[Cluster]>>>,
}

impl std::fmt::Debug for ShapeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("ShapeCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}

impl ShapeCache {
    /// Wrap an engine; a zero capacity is raised to one entry.
    pub fn new(engine: ShapingEngine, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            engine,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn with_default_capacity(engine: ShapingEngine) -> Self {
        Self::new(engine, DEFAULT_SHAPE_CACHE_SIZE)
    }

    /// Return the cached clusters for `request`, shaping on a miss.
    pub fn get_or_shape(&self, request: &ShapeRequest) -> Result<Arc<[Cluster]>, ShapeError> {
        if let Some(hit) = self.entries.lock().get(request) {
            return Ok(Arc::clone(hit));
        }

        log::debug!(
            "Shape cache miss ({} bytes, script {:?}, {})",
            request.text.len(),
            request.script,
            request.direction
        );
        let clusters: Arc<[Cluster]> = self.engine.shape(request)?.into();
        self.entries
            .lock()
            .put(request.clone(), Arc::clone(&clusters));
        Ok(clusters)
    }

    pub fn engine(&self) -> &ShapingEngine {
        &self.engine
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
