//! File name rules for collapsing multi-track dumps
//!
//! Track dumps are named like `Game (Track 01).bin`. Stripping that marker
//! gives the name shared by every file belonging to the same disc.

use regex::Regex;
use std::sync::LazyLock;

use super::formats::DiscFormat;

// Trailing "(Track N)" marker, including any whitespace around it
static TRACK_SUFFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\(track\s*[0-9]+\)\s*$").unwrap()
});

// "(Track 1)" with any number of leading zeros
static FIRST_TRACK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(track\s*0*1\)\s*$").unwrap()
});

/// Strip a trailing `(Track N)` marker from a base name
///
/// `"Final Fantasy VII (Track 02)"` becomes `"Final Fantasy VII"`. Names
/// without the marker are returned unchanged. Stacked markers are all
/// removed, so normalizing an already normalized name is a no-op. The result
/// is always a prefix of the input.
pub fn normalize_base_name(base_name: &str) -> &str {
    let mut name = base_name;
    while let Some(m) = TRACK_SUFFIX_PATTERN.find(name) {
        name = &name[..m.start()];
    }
    name
}

/// Whether a base name ends with a `(Track N)` marker
pub fn has_track_suffix(base_name: &str) -> bool {
    TRACK_SUFFIX_PATTERN.is_match(base_name)
}

/// Whether a file is one fragment of a multi-track bin dump
pub fn is_track_bin(base_name: &str, format: DiscFormat) -> bool {
    format == DiscFormat::Bin && has_track_suffix(base_name)
}

/// Whether a base name carries the first-track marker (`Track 1`, `Track 01`, ...)
pub fn is_first_track(base_name: &str) -> bool {
    FIRST_TRACK_PATTERN.is_match(base_name)
}
