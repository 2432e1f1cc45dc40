//! Font discovery and loading backed by the system font database.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use fontdb::{Database, Family, Query, Source};

use super::fallbacks::{SCRIPT_FONTS, script_fonts};
use super::types::{FontHandle, FontSource};
use crate::error::FontResolutionError;

/// Source of fonts for the resolver.
///
/// The resolver only decides *which* font to use; providers know where fonts live
/// and how to turn them into [`FontHandle`]s.
pub trait FontProvider: Send + Sync {
    /// Find a font for a family name, or `None` if the host does not have it.
    fn locate(&self, family: &str) -> Option<FontSource>;

    /// Read and validate a font.
    fn load(&self, source: &FontSource) -> Result<FontHandle, FontResolutionError>;

    /// List known family names, optionally only those suited to a script tag.
    fn enumerate(&self, script: Option<&str>) -> Vec<String>;
}

/// [`FontProvider`] over the fonts installed on this machine.
///
/// The font database is built on first use and kept for the life of the provider.
#[derive(Default)]
pub struct SystemFontProvider {
    font_db: OnceLock<Database>,
}

impl SystemFontProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn db(&self) -> &Database {
        self.font_db.get_or_init(|| {
            let mut font_db = Database::new();
            font_db.load_system_fonts();
            log::info!("Loaded {} system fonts", font_db.len());
            font_db
        })
    }

    fn source_for(font_db: &Database, id: fontdb::ID, family: &str) -> Option<FontSource> {
        let face = font_db.face(id)?;
        match &face.source {
            Source::File(path) => Some(FontSource::File {
                path: path.clone(),
                index: face.index,
            }),
            _ => {
                let (data, index) =
                    font_db.with_face_data(id, |data, index| (data.to_vec(), index))?;
                Some(FontSource::Memory {
                    key: format!("family:{}#{}", family, index),
                    data: Arc::new(data),
                    index,
                })
            }
        }
    }
}

/// Compare family names ignoring case, spaces, dashes and underscores, so that
/// `NotoSansTelugu` matches `Noto Sans Telugu`.
fn squash(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FontProvider for SystemFontProvider {
    fn locate(&self, family: &str) -> Option<FontSource> {
        let font_db = self.db();
        let families = [Family::Name(family)];
        let query = Query {
            families: &families,
            ..Query::default()
        };

        if let Some(id) = font_db.query(&query) {
            return Self::source_for(font_db, id, family);
        }

        // Loose match on family names, then on file stems
        let wanted = squash(family);
        let by_family = font_db.faces().find(|face| {
            face.families
                .iter()
                .any(|(name, _)| squash(name) == wanted)
        });
        let face = by_family.or_else(|| {
            font_db.faces().find(|face| match &face.source {
                Source::File(path) => path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| squash(stem).contains(&wanted)),
                _ => false,
            })
        })?;
        log::debug!("Loose font match for '{}': {:?}", family, face.families);
        Self::source_for(font_db, face.id, family)
    }

    fn load(&self, source: &FontSource) -> Result<FontHandle, FontResolutionError> {
        match source {
            FontSource::File { path, index } => load_font_file(path, *index),
            FontSource::Memory { key, data, index } => {
                FontHandle::parse(key.clone(), Arc::clone(data), *index).ok_or_else(|| {
                    FontResolutionError::Load {
                        source_key: key.clone(),
                        reason: "not a valid font".to_string(),
                    }
                })
            }
        }
    }

    fn enumerate(&self, script: Option<&str>) -> Vec<String> {
        let font_db = self.db();
        let script_entry = script.and_then(script_fonts);
        if script.is_some() && script_entry.is_none() {
            log::warn!(
                "Unknown script filter '{}', known: {}",
                script.unwrap_or_default(),
                SCRIPT_FONTS
                    .iter()
                    .map(|entry| entry.tag)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            return Vec::new();
        }

        let mut names: Vec<String> = font_db
            .faces()
            .filter(|face| match script_entry {
                None => true,
                Some(entry) => {
                    let by_name = face.families.iter().any(|(name, _)| {
                        let lower = name.to_lowercase();
                        entry.name_patterns.iter().any(|p| lower.contains(p))
                    });
                    by_name
                        || font_db
                            .with_face_data(face.id, |data, index| {
                                swash::FontRef::from_index(data, index as usize)
                                    .is_some_and(|font| font.charmap().map(entry.sample) != 0)
                            })
                            .unwrap_or(false)
                }
            })
            .filter_map(|face| face.families.first().map(|(name, _)| name.clone()))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Read a font file from disk and validate the requested face.
pub fn load_font_file(path: &Path, index: u32) -> Result<FontHandle, FontResolutionError> {
    let source_key = FontSource::File {
        path: path.to_path_buf(),
        index,
    }
    .key();
    let data = std::fs::read(path).map_err(|e| FontResolutionError::Load {
        source_key: source_key.clone(),
        reason: e.to_string(),
    })?;
    log::debug!("Read {} bytes from font file {}", data.len(), source_key);
    FontHandle::parse(source_key.clone(), Arc::new(data), index).ok_or(
        FontResolutionError::Load {
            source_key,
            reason: "not a valid font".to_string(),
        },
    )
}
