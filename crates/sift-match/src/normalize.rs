//! Text normalization for matching.
//!
//! All matching phases operate on NFC-normalized character sequences so that
//! composed and decomposed forms of the same grapheme compare equal. Case
//! folding is applied here as well when the active policy asks for it.

use unicode_normalization::UnicodeNormalization;

/// Normalize `input` to NFC and optionally case-fold it, returning the
/// character sequence the matcher operates on.
///
/// Indices reported by the matcher refer to positions in this sequence.
#[must_use]
pub fn fold(input: &str, case_sensitive: bool) -> Vec<char> {
    if case_sensitive {
        input.nfc().collect()
    } else {
        input.nfc().flat_map(char::to_lowercase).collect()
    }
}

/// True when the character at `idx` starts a word: position zero, or the
/// preceding character is not alphanumeric.
#[must_use]
pub fn is_word_boundary(chars: &[char], idx: usize) -> bool {
    idx == 0 || chars.get(idx - 1).is_some_and(|c| !c.is_alphanumeric())
}
