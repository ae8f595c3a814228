//! Display-name cleaning for layer directories and asset file names.
//!
//! Asset names carry ordering prefixes and separators that must not leak
//! into marketplace attributes: `06.-Black-Rat.png` reads as `Black Rat`,
//! `02_Quad_UL` as `Quad UL`. The same cleaning applies to trait types and
//! values so the two stay consistent.

/// Cleans a raw directory or file name into a display string.
///
/// Rules, in order: drop a trailing alphabetic extension, split on `.`,
/// `-`, `_` and spaces, drop all-digit tokens, strip digits from mixed
/// tokens, and join the survivors with single spaces. A token spelling
/// "3d" in any case is preserved as the literal `3D`.
#[must_use]
pub fn clean(raw: &str) -> String {
    let stem = match raw.rsplit_once('.') {
        Some((base, ext))
            if !base.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            base
        }
        _ => raw,
    };

    let mut parts: Vec<String> = Vec::new();
    for token in stem.split(['.', '-', '_', ' ']) {
        if token.is_empty() || token.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if token.eq_ignore_ascii_case("3d") {
            parts.push("3D".to_string());
            continue;
        }
        let letters: String = token.chars().filter(|c| !c.is_ascii_digit()).collect();
        if !letters.is_empty() {
            parts.push(letters);
        }
    }

    parts.join(" ")
}
