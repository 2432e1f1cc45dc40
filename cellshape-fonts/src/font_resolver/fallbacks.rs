//! Font fallback chain configuration.
//!
//! Defines the priority order of generic fallback fonts and the preferred
//! families for each complex script.

/// Generic fallback font families in priority order.
///
/// These are tried after any explicit path, explicit family and script-specific
/// family. The order favors fonts with broad Unicode coverage:
/// 1. General sans-serif families found on most Linux distributions
/// 2. Platform defaults on macOS and Windows
/// 3. Monospace families as a last resort
pub const FALLBACK_FAMILIES: &[&str] = &[
    // Broad coverage sans fonts
    "DejaVu Sans",
    "Noto Sans",
    "FreeSans",
    "Liberation Sans",
    // Platform defaults
    "Arial",
    "Helvetica",
    "Arial Unicode MS",
    "Segoe UI",
    // Monospace
    "DejaVu Sans Mono",
    "Noto Sans Mono",
    "Menlo",
    "Consolas",
];

/// Preferred families for a script, plus a sample character used to check
/// whether a font actually covers the script.
#[derive(Debug, Clone, Copy)]
pub struct ScriptFonts {
    /// Lowercase ISO 15924 tag (`"telu"`, `"arab"`, ...)
    pub tag: &'static str,
    /// Character every font for this script must map
    pub sample: char,
    /// Family names in priority order
    pub families: &'static [&'static str],
    /// Lowercase fragments that identify a font for this script by name
    pub name_patterns: &'static [&'static str],
}

/// Script-specific font preferences.
pub const SCRIPT_FONTS: &[ScriptFonts] = &[
    ScriptFonts {
        tag: "arab",
        sample: 'ب',
        families: &["Noto Sans Arabic", "Noto Naskh Arabic", "Amiri", "Geeza Pro"],
        name_patterns: &["arab", "nastaliq", "naskh"],
    },
    ScriptFonts {
        tag: "hebr",
        sample: 'א',
        families: &["Noto Sans Hebrew", "Arial Hebrew", "David"],
        name_patterns: &["hebr"],
    },
    ScriptFonts {
        tag: "deva",
        sample: 'क',
        families: &["Noto Sans Devanagari", "Lohit Devanagari", "Mangal"],
        name_patterns: &["devanagari", "deva"],
    },
    ScriptFonts {
        tag: "telu",
        sample: 'త',
        families: &["Noto Sans Telugu", "Lohit Telugu", "Gautami"],
        name_patterns: &["telugu", "telu"],
    },
    ScriptFonts {
        tag: "taml",
        sample: 'த',
        families: &["Noto Sans Tamil", "Lohit Tamil", "Latha"],
        name_patterns: &["tamil", "taml"],
    },
    ScriptFonts {
        tag: "beng",
        sample: 'ক',
        families: &["Noto Sans Bengali", "Lohit Bengali", "Vrinda"],
        name_patterns: &["bengali", "beng"],
    },
    ScriptFonts {
        tag: "gujr",
        sample: 'ક',
        families: &["Noto Sans Gujarati", "Lohit Gujarati", "Shruti"],
        name_patterns: &["gujarati", "gujr"],
    },
    ScriptFonts {
        tag: "knda",
        sample: 'ಕ',
        families: &["Noto Sans Kannada", "Lohit Kannada", "Tunga"],
        name_patterns: &["kannada", "knda"],
    },
    ScriptFonts {
        tag: "mlym",
        sample: 'ക',
        families: &["Noto Sans Malayalam", "Lohit Malayalam", "Kartika"],
        name_patterns: &["malayalam", "mlym"],
    },
    ScriptFonts {
        tag: "mymr",
        sample: 'က',
        families: &["Noto Sans Myanmar", "Padauk", "Myanmar Text"],
        name_patterns: &["myanmar", "mymr", "padauk"],
    },
    ScriptFonts {
        tag: "thai",
        sample: 'ก',
        families: &["Noto Sans Thai", "Tlwg Typo", "Thonburi", "Leelawadee UI"],
        name_patterns: &["thai", "tlwg"],
    },
    ScriptFonts {
        tag: "khmr",
        sample: 'ក',
        families: &["Noto Sans Khmer", "Khmer OS", "Khmer UI"],
        name_patterns: &["khmer", "khmr"],
    },
    ScriptFonts {
        tag: "laoo",
        sample: 'ກ',
        families: &["Noto Sans Lao", "Phetsarath OT", "Lao UI"],
        name_patterns: &["lao"],
    },
];

/// Look up the font preferences for a script tag (case-insensitive).
pub fn script_fonts(tag: &str) -> Option<&'static ScriptFonts> {
    SCRIPT_FONTS
        .iter()
        .find(|entry| entry.tag.eq_ignore_ascii_case(tag))
}
