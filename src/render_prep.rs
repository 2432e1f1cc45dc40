//! Display helpers for complex scripts.
//!
//! Some terminals draw the marks of joined scripts on top of the next cell.
//! Following each such character with a hair space gives the glyph room
//! without changing what the text says.

use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;
use unicode_script::{Script, UnicodeScript};

/// U+200A HAIR SPACE
pub const HAIR_SPACE: char = '\u{200A}';

/// Scripts whose characters get a trailing [`HAIR_SPACE`].
pub const COMPLEX_SCRIPTS: &[Script] = &[
    Script::Arabic,
    Script::Hebrew,
    Script::Devanagari,
    Script::Telugu,
    Script::Tamil,
    Script::Bengali,
    Script::Gujarati,
    Script::Kannada,
    Script::Malayalam,
    Script::Myanmar,
    Script::Thai,
    Script::Khmer,
    Script::Lao,
];

fn is_complex(character: char) -> bool {
    COMPLEX_SCRIPTS.contains(&character.script())
}

/// Whether any character of `text` belongs to a complex script.
pub fn needs_complex_rendering(text: &str) -> bool {
    !text.is_ascii() && text.chars().any(is_complex)
}

/// Follow every complex-script character with a hair space.
///
/// Text without complex-script characters is returned unchanged.
pub fn insert_spacing(text: &str) -> Cow<'_, str> {
    if !needs_complex_rendering(text) {
        return Cow::Borrowed(text);
    }

    let mut spaced = String::with_capacity(text.len() * 2);
    for character in text.chars() {
        spaced.push(character);
        if is_complex(character) {
            spaced.push(HAIR_SPACE);
        }
    }
    Cow::Owned(spaced)
}

/// NFC-normalize `text`, then [`insert_spacing`].
pub fn improve_rendering(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }
    let normalized: String = text.nfc().collect();
    Cow::Owned(insert_spacing(&normalized).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_complex_rendering() {
        assert!(!needs_complex_rendering(""));
        assert!(!needs_complex_rendering("Hello"));
        assert!(!needs_complex_rendering("café 日本"));
        assert!(needs_complex_rendering("తెలుగు"));
        assert!(needs_complex_rendering("say مرحبا"));
        assert!(needs_complex_rendering("ภาษาไทย"));
    }

    #[test]
    fn test_ascii_is_untouched() {
        assert!(matches!(improve_rendering("Hello"), Cow::Borrowed("Hello")));
        assert!(matches!(insert_spacing("Hello"), Cow::Borrowed("Hello")));
        assert_eq!(improve_rendering(""), "");
    }

    #[test]
    fn test_hair_space_after_each_telugu_character() {
        assert_eq!(improve_rendering("తె"), "త\u{200A}ె\u{200A}");
    }

    #[test]
    fn test_only_complex_characters_are_spaced() {
        assert_eq!(insert_spacing("a తె!"), "a త\u{200A}ె\u{200A}!");
    }

    #[test]
    fn test_non_complex_non_ascii_is_normalized_only() {
        assert_eq!(improve_rendering("e\u{0301}"), "é");
    }

    #[test]
    fn test_stripping_hair_spaces_recovers_nfc() {
        for text in ["తెలుగు", "हिन्दी", "مرحبا", "English, தமிழ்"] {
            let improved = improve_rendering(text);
            let stripped: String = improved.chars().filter(|c| *c != HAIR_SPACE).collect();
            let nfc: String = text.nfc().collect();
            assert_eq!(stripped, nfc);
        }
    }
}
