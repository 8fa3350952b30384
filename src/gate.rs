//! Passphrase normalisation for the unlock gate.
//!
//! The gate is a cosmetic barrier. The secret ships in plain text in the
//! config file and nothing here should be mistaken for authentication.

const QUOTE_CHARS: &[char] = &['\'', '\u{2019}', '\u{2018}', '"', '\u{201C}', '\u{201D}', '`'];

/// Canonical form used for comparison: lowercase ASCII letters and digits only.
pub fn normalize(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|ch| !QUOTE_CHARS.contains(ch))
        .filter(|ch| !ch.is_whitespace())
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
        .collect()
}

/// True when `input` and `canonical` normalise to the same non-empty string.
pub fn matches(input: &str, canonical: &str) -> bool {
    let expected = normalize(canonical);
    if expected.is_empty() {
        return false;
    }
    normalize(input) == expected
}
