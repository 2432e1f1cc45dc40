//! The host's "visible width of a string" slot.
//!
//! Everything that lays text out in cells asks [`cell_len`]. The slot starts
//! bound to the pristine per-codepoint measurement and can be rebound at
//! runtime; reads go through an [`ArcSwap`] and never take a lock.
//!
//! Code that prefers not to depend on the global can take an
//! `Arc<dyn WidthStrategy>` directly (see [`Console`](crate::console::Console)).

use std::fmt;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use unicode_width::UnicodeWidthStr;

/// Something that can tell how many terminal cells a string occupies.
pub trait WidthStrategy: Send + Sync {
    fn cell_len(&self, text: &str) -> usize;
}

/// Per-codepoint width from the Unicode East Asian Width tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeWidth;

impl WidthStrategy for UnicodeWidth {
    fn cell_len(&self, text: &str) -> usize {
        text.width()
    }
}

/// Whatever the global slot is bound to at call time.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostWidth;

impl WidthStrategy for HostWidth {
    fn cell_len(&self, text: &str) -> usize {
        cell_len(text)
    }
}

/// A named strategy occupying the host slot.
pub struct WidthBinding {
    name: String,
    strategy: Arc<dyn WidthStrategy>,
}

impl fmt::Debug for WidthBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidthBinding")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl WidthBinding {
    pub fn new(name: impl Into<String>, strategy: Arc<dyn WidthStrategy>) -> Self {
        Self {
            name: name.into(),
            strategy,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy(&self) -> &Arc<dyn WidthStrategy> {
        &self.strategy
    }
}

impl WidthStrategy for WidthBinding {
    fn cell_len(&self, text: &str) -> usize {
        self.strategy.cell_len(text)
    }
}

static PRISTINE: LazyLock<Arc<WidthBinding>> =
    LazyLock::new(|| Arc::new(WidthBinding::new("unicode-width", Arc::new(UnicodeWidth))));

static SLOT: LazyLock<ArcSwap<WidthBinding>> =
    LazyLock::new(|| ArcSwap::new(Arc::clone(&PRISTINE)));

/// Cell width of `text` according to the current binding.
pub fn cell_len(text: &str) -> usize {
    SLOT.load().cell_len(text)
}

/// The binding currently in the slot.
pub fn current() -> Arc<WidthBinding> {
    SLOT.load_full()
}

/// Put `binding` in the slot and return the one it replaced.
pub fn replace(binding: Arc<WidthBinding>) -> Arc<WidthBinding> {
    log::debug!("Host width slot bound to '{}'", binding.name());
    SLOT.swap(binding)
}

/// The binding the slot started with.
pub fn pristine() -> Arc<WidthBinding> {
    Arc::clone(&PRISTINE)
}
