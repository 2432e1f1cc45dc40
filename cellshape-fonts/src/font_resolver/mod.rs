//! Font resolution with a fallback chain and a process-lifetime handle cache.
//!
//! A request is resolved by trying, in order:
//! 1. An explicit font file path
//! 2. An explicit family name
//! 3. The preferred families for the requested script
//! 4. The generic [`FALLBACK_FAMILIES`]
//!
//! The first font that loads wins. Loaded fonts are cached by their resolved
//! identity (the font path, or a synthetic key for in-memory fonts), and every
//! lookup that led to them is remembered, so a font file is read at most once.

mod fallbacks;
mod loader;
mod types;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::FontResolutionError;

pub use fallbacks::{FALLBACK_FAMILIES, SCRIPT_FONTS, ScriptFonts, script_fonts};
pub use loader::{FontProvider, SystemFontProvider, load_font_file};
pub use types::{FontHandle, FontSource};

#[derive(Default)]
struct ResolutionCache {
    /// Loaded fonts keyed by resolved identity
    handles: HashMap<String, FontHandle>,
    /// Lookup key ("path:..", "family:..") to resolved identity; `None` records a miss
    lookups: HashMap<String, Option<String>>,
    /// Explicit paths that exist but failed to load; the error is replayed
    failed_paths: HashMap<String, FontResolutionError>,
}

/// Resolves paths, family names and script tags to loaded fonts.
pub struct FontResolver {
    provider: Arc<dyn FontProvider>,
    cache: Mutex<ResolutionCache>,
}

impl std::fmt::Debug for FontResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResolver")
            .field("cached_fonts", &self.cached_fonts())
            .finish()
    }
}

impl FontResolver {
    /// Create a resolver over an arbitrary font provider.
    pub fn new(provider: Arc<dyn FontProvider>) -> Self {
        Self {
            provider,
            cache: Mutex::new(ResolutionCache::default()),
        }
    }

    /// Create a resolver over the fonts installed on this machine.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemFontProvider::new()))
    }

    /// Resolve a font, walking the fallback chain.
    ///
    /// # Arguments
    /// * `path` - Explicit font file; if it exists it must load, otherwise it is skipped
    /// * `name` - Explicit family name
    /// * `script` - ISO 15924 script tag used to pick a script-specific family
    ///
    /// # Errors
    /// [`FontResolutionError::Load`] if an existing explicit path cannot be parsed,
    /// [`FontResolutionError::NotFound`] once every step of the chain failed.
    pub fn resolve(
        &self,
        path: Option<&Path>,
        name: Option<&str>,
        script: Option<&str>,
    ) -> Result<FontHandle, FontResolutionError> {
        let mut tried = Vec::new();

        if let Some(path) = path {
            if path.exists() {
                return self.resolve_path(path);
            }
            log::warn!("Font path {} does not exist, skipping", path.display());
            tried.push(path.display().to_string());
        }

        if let Some(name) = name {
            if let Some(handle) = self.resolve_family(name) {
                return Ok(handle);
            }
            tried.push(name.to_string());
        }

        if let Some(entry) = script.and_then(script_fonts) {
            for family in entry.families {
                if let Some(handle) = self.resolve_family(family) {
                    log::debug!("Using '{}' for script {}", family, entry.tag);
                    return Ok(handle);
                }
                tried.push((*family).to_string());
            }
        }

        self.resolve_fallback(tried)
    }

    /// Resolve using only the generic fallback chain.
    pub fn resolve_generic(&self) -> Result<FontHandle, FontResolutionError> {
        self.resolve_fallback(Vec::new())
    }

    fn resolve_fallback(&self, mut tried: Vec<String>) -> Result<FontHandle, FontResolutionError> {
        for family in FALLBACK_FAMILIES {
            if let Some(handle) = self.resolve_family(family) {
                return Ok(handle);
            }
            tried.push((*family).to_string());
        }
        log::error!("Font fallback chain exhausted after {} candidates", tried.len());
        Err(FontResolutionError::NotFound { tried })
    }

    fn resolve_path(&self, path: &Path) -> Result<FontHandle, FontResolutionError> {
        let lookup = format!("path:{}", path.display());
        if let Some(Some(handle)) = self.cached_lookup(&lookup) {
            return Ok(handle);
        }
        if let Some(err) = self.cache.lock().failed_paths.get(&lookup) {
            return Err(err.clone());
        }

        let source = FontSource::File {
            path: path.to_path_buf(),
            index: 0,
        };
        self.load_and_cache(&lookup, &source).inspect_err(|e| {
            log::error!("Font path {} is unusable: {}", path.display(), e);
            self.cache
                .lock()
                .failed_paths
                .insert(lookup.clone(), e.clone());
        })
    }

    /// Resolve a family name; load failures are logged and treated as a miss.
    fn resolve_family(&self, family: &str) -> Option<FontHandle> {
        let lookup = format!("family:{}", family);
        if let Some(cached) = self.cached_lookup(&lookup) {
            return cached;
        }

        let Some(source) = self.provider.locate(family) else {
            log::debug!("Font family '{}' not found", family);
            self.cache.lock().lookups.insert(lookup, None);
            return None;
        };

        match self.load_and_cache(&lookup, &source) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Font family '{}' found but unusable: {}", family, e);
                self.cache.lock().lookups.insert(lookup, None);
                None
            }
        }
    }

    /// `None` if never looked up, `Some(None)` for a remembered miss.
    fn cached_lookup(&self, lookup: &str) -> Option<Option<FontHandle>> {
        let cache = self.cache.lock();
        let resolved = cache.lookups.get(lookup)?;
        Some(resolved.as_ref().and_then(|key| cache.handles.get(key).cloned()))
    }

    fn load_and_cache(
        &self,
        lookup: &str,
        source: &FontSource,
    ) -> Result<FontHandle, FontResolutionError> {
        let key = source.key();

        // Another lookup may already have loaded the same file
        {
            let mut cache = self.cache.lock();
            if let Some(handle) = cache.handles.get(&key).cloned() {
                cache.lookups.insert(lookup.to_string(), Some(key));
                return Ok(handle);
            }
        }

        // Load outside the lock; file I/O may block
        let handle = self.provider.load(source)?;
        log::info!("Loaded font {}", key);

        let mut cache = self.cache.lock();
        let handle = cache.handles.entry(key.clone()).or_insert(handle).clone();
        cache.lookups.insert(lookup.to_string(), Some(key));
        Ok(handle)
    }

    /// Number of distinct fonts loaded so far.
    pub fn cached_fonts(&self) -> usize {
        self.cache.lock().handles.len()
    }

    /// List font families known to the provider, optionally filtered by script.
    pub fn list_fonts(&self, script: Option<&str>) -> Vec<String> {
        self.provider.enumerate(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that knows a fixed set of families and counts loads.
    struct CountingProvider {
        families: Vec<&'static str>,
        loads: AtomicUsize,
    }

    impl CountingProvider {
        fn new(families: &[&'static str]) -> Arc<Self> {
            Arc::new(Self {
                families: families.to_vec(),
                loads: AtomicUsize::new(0),
            })
        }
    }

    impl FontProvider for CountingProvider {
        fn locate(&self, family: &str) -> Option<FontSource> {
            self.families
                .iter()
                .find(|f| **f == family)
                .map(|f| FontSource::Memory {
                    key: format!("mem:{}", f),
                    data: Arc::new(Vec::new()),
                    index: 0,
                })
        }

        fn load(&self, source: &FontSource) -> Result<FontHandle, FontResolutionError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            match source {
                FontSource::Memory { key, data, index } => {
                    Ok(FontHandle::new(key.clone(), Arc::clone(data), *index))
                }
                FontSource::File { path, index } => load_font_file(path, *index),
            }
        }

        fn enumerate(&self, _script: Option<&str>) -> Vec<String> {
            self.families.iter().map(|f| f.to_string()).collect()
        }
    }

    #[test]
    fn test_explicit_name_wins_over_script_and_fallback() {
        let provider = CountingProvider::new(&["My Font", "Noto Sans Telugu", "DejaVu Sans"]);
        let resolver = FontResolver::new(provider);
        let handle = resolver.resolve(None, Some("My Font"), Some("telu")).unwrap();
        assert_eq!(handle.key(), "mem:My Font");
    }

    #[test]
    fn test_script_font_preferred_over_generic() {
        let provider = CountingProvider::new(&["Noto Sans Telugu", "DejaVu Sans"]);
        let resolver = FontResolver::new(provider);
        let handle = resolver.resolve(None, None, Some("telu")).unwrap();
        assert_eq!(handle.key(), "mem:Noto Sans Telugu");
    }

    #[test]
    fn test_missing_path_and_name_fall_through_to_generic() {
        let provider = CountingProvider::new(&["Noto Sans"]);
        let resolver = FontResolver::new(provider);
        let handle = resolver
            .resolve(
                Some(Path::new("/no/such/font.ttf")),
                Some("Nope"),
                Some("arab"),
            )
            .unwrap();
        assert_eq!(handle.key(), "mem:Noto Sans");
    }

    #[test]
    fn test_exhausted_chain_reports_candidates() {
        let resolver = FontResolver::new(CountingProvider::new(&[]));
        let err = resolver.resolve(None, Some("Nope"), None).unwrap_err();
        match err {
            FontResolutionError::NotFound { tried } => {
                assert_eq!(tried[0], "Nope");
                assert_eq!(tried.len(), 1 + FALLBACK_FAMILIES.len());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_repeated_resolution_loads_once() {
        let provider = CountingProvider::new(&["DejaVu Sans"]);
        let resolver = FontResolver::new(Arc::clone(&provider) as Arc<dyn FontProvider>);
        let first = resolver.resolve(None, Some("DejaVu Sans"), None).unwrap();
        let second = resolver.resolve(None, Some("DejaVu Sans"), None).unwrap();
        let generic = resolver.resolve_generic().unwrap();
        assert_eq!(first, second);
        assert_eq!(first, generic);
        assert_eq!(provider.loads.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached_fonts(), 1);
    }

    #[test]
    fn test_existing_unparsable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"broken").unwrap();

        let resolver = FontResolver::new(CountingProvider::new(&["DejaVu Sans"]));
        let err = resolver.resolve(Some(&path), None, None).unwrap_err();
        assert!(matches!(err, FontResolutionError::Load { .. }));
    }

    #[test]
    fn test_broken_path_is_read_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.ttf");
        std::fs::write(&path, b"junk").unwrap();

        let provider = CountingProvider::new(&["DejaVu Sans"]);
        let resolver = FontResolver::new(Arc::clone(&provider) as Arc<dyn FontProvider>);
        let first = resolver.resolve(Some(&path), None, None).unwrap_err();
        for _ in 0..4 {
            assert_eq!(resolver.resolve(Some(&path), None, None).unwrap_err(), first);
        }
        assert_eq!(provider.loads.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached_fonts(), 0);
    }
}
