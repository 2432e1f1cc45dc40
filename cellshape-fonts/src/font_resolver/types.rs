//! Font handle types shared by the resolver, providers and shapers.

use std::path::PathBuf;
use std::sync::Arc;
use swash::FontRef;

/// Where a font's bytes come from.
#[derive(Clone)]
pub enum FontSource {
    /// A font file on disk, with the face index inside it (non-zero for .ttc collections)
    File { path: PathBuf, index: u32 },
    /// Font bytes already in memory, identified by a synthetic key
    Memory {
        key: String,
        data: Arc<Vec<u8>>,
        index: u32,
    },
}

impl FontSource {
    /// Resolved identity used as the resolver cache key.
    pub fn key(&self) -> String {
        match self {
            FontSource::File { path, index: 0 } => path.display().to_string(),
            FontSource::File { path, index } => format!("{}#{}", path.display(), index),
            FontSource::Memory { key, .. } => key.clone(),
        }
    }
}

impl std::fmt::Debug for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontSource::File { path, index } => f
                .debug_struct("File")
                .field("path", path)
                .field("index", index)
                .finish(),
            FontSource::Memory { key, data, index } => f
                .debug_struct("Memory")
                .field("key", key)
                .field("data_len", &data.len())
                .field("index", index)
                .finish(),
        }
    }
}

/// Owned font bytes plus the face to use within them.
struct FontData {
    key: String,
    data: Arc<Vec<u8>>,
    face_index: u32,
}

/// Opaque, immutable handle to a loaded font.
///
/// Cloning is cheap; every clone shares the same bytes. Handles are created once
/// by a [`FontProvider`](super::FontProvider) and then reused for the life of the
/// process.
#[derive(Clone)]
pub struct FontHandle {
    inner: Arc<FontData>,
}

impl std::fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontHandle")
            .field("key", &self.inner.key)
            .field("data_len", &self.inner.data.len())
            .field("face_index", &self.inner.face_index)
            .finish()
    }
}

impl PartialEq for FontHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl FontHandle {
    /// Wrap font bytes without validating them.
    ///
    /// Providers that accept arbitrary input should prefer [`FontHandle::parse`].
    pub fn new(key: impl Into<String>, data: Arc<Vec<u8>>, face_index: u32) -> Self {
        Self {
            inner: Arc::new(FontData {
                key: key.into(),
                data,
                face_index,
            }),
        }
    }

    /// Wrap font bytes after checking they contain a parsable face.
    ///
    /// # Returns
    /// `Some(FontHandle)` if the font data is valid, `None` otherwise.
    pub fn parse(key: impl Into<String>, data: Arc<Vec<u8>>, face_index: u32) -> Option<Self> {
        FontRef::from_index(data.as_slice(), face_index as usize)?;
        Some(Self::new(key, data, face_index))
    }

    /// Resolved identity of this font (path or synthetic key).
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Raw font bytes (TTF/OTF/TTC).
    pub fn data(&self) -> &[u8] {
        self.inner.data.as_slice()
    }

    /// Face index within the font bytes.
    pub fn face_index(&self) -> u32 {
        self.inner.face_index
    }

    /// Swash view of the face, if the bytes parse.
    pub fn font_ref(&self) -> Option<FontRef<'_>> {
        FontRef::from_index(self.data(), self.face_index() as usize)
    }

    /// Whether the font maps `character` to a real glyph.
    pub fn covers(&self, character: char) -> bool {
        self.font_ref()
            .map(|font| font.charmap().map(character) != 0)
            .unwrap_or(false)
    }
}
