//! Script detection and script-run segmentation.
//!
//! Shaping engines need runs that share one script. Text is split at grapheme
//! boundaries; script-neutral characters (spaces, digits, punctuation, combining
//! marks) join the run they appear in, and a run made only of neutral characters
//! is tagged with [`GENERIC_SCRIPT`].

use std::ops::Range;

use unicode_script::{Script, UnicodeScript};
use unicode_segmentation::UnicodeSegmentation;

/// Script tag used when no specific script can be determined.
pub const GENERIC_SCRIPT: &str = "latn";

/// A maximal byte range of text sharing one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRun {
    /// Byte range in the segmented text
    pub range: Range<usize>,
    /// Lowercase ISO 15924 tag
    pub tag: String,
}

/// The specific script of a character, or `None` for Common/Inherited/Unknown.
pub fn char_script(character: char) -> Option<Script> {
    match character.script() {
        Script::Common | Script::Inherited | Script::Unknown => None,
        script => Some(script),
    }
}

/// Lowercase ISO 15924 tag for a script (`Script::Telugu` -> `"telu"`).
pub fn script_tag(script: Script) -> String {
    script.short_name().to_ascii_lowercase()
}

/// Split `text` into script-homogeneous runs covering it without gaps.
pub fn segment_by_script(text: &str) -> Vec<ScriptRun> {
    let mut runs: Vec<(Range<usize>, Option<Script>)> = Vec::new();

    for (start, grapheme) in text.grapheme_indices(true) {
        let end = start + grapheme.len();
        let script = grapheme.chars().find_map(char_script);

        if let Some((range, current)) = runs.last_mut() {
            match (*current, script) {
                (_, None) => {
                    range.end = end;
                    continue;
                }
                (None, Some(script)) => {
                    *current = Some(script);
                    range.end = end;
                    continue;
                }
                (Some(existing), Some(script)) if existing == script => {
                    range.end = end;
                    continue;
                }
                _ => {}
            }
        }
        runs.push((start..end, script));
    }

    runs.into_iter()
        .map(|(range, script)| ScriptRun {
            range,
            tag: script.map_or_else(|| GENERIC_SCRIPT.to_string(), script_tag),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_no_runs() {
        assert!(segment_by_script("").is_empty());
    }

    #[test]
    fn test_neutral_text_uses_generic_tag() {
        let runs = segment_by_script("123 !?");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].tag, GENERIC_SCRIPT);
        assert_eq!(runs[0].range, 0..6);
    }

    #[test]
    fn test_single_script_is_one_run() {
        let runs = segment_by_script("తెలుగు");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].tag, "telu");
    }

    #[test]
    fn test_mixed_scripts_split_and_cover_text() {
        let text = "Hello, తెలుగు हिन्दी";
        let runs = segment_by_script(text);
        let tags: Vec<&str> = runs.iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, vec!["latn", "telu", "deva"]);

        // Runs are contiguous and cover the whole string
        assert_eq!(runs[0].range.start, 0);
        for pair in runs.windows(2) {
            assert_eq!(pair[0].range.end, pair[1].range.start);
        }
        assert_eq!(runs.last().unwrap().range.end, text.len());
    }

    #[test]
    fn test_leading_neutral_joins_first_script() {
        let runs = segment_by_script("  مرحبا");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].tag, "arab");
    }

    #[test]
    fn test_combining_mark_stays_with_base() {
        // e + combining acute, then Greek
        let runs = segment_by_script("e\u{0301}α");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].range, 0..3);
        assert_eq!(runs[1].tag, "grek");
    }
}
