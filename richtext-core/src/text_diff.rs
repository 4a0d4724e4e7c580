//! Common-affix reduction of a text replacement to one delete and one insert

/// A single edit turning one string into another, in character units
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEdit {
    /// Offset where the old middle starts
    pub start: usize,
    /// Characters removed at `start`
    pub delete_len: usize,
    /// Text inserted at `start` after the removal
    pub insert: String,
}

/// Compute the minimal middle edit between `old` and `new`.
///
/// The common prefix is taken first, then the common suffix, bounded so the
/// two never overlap. Returns None when the strings are equal.
pub fn compute(old: &str, new: &str) -> Option<TextEdit> {
    if old == new {
        return None;
    }

    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();
    let shorter = old_chars.len().min(new_chars.len());

    let prefix = old_chars
        .iter()
        .zip(&new_chars)
        .take_while(|(a, b)| a == b)
        .count();

    let suffix = old_chars[prefix..]
        .iter()
        .rev()
        .zip(new_chars[prefix..].iter().rev())
        .take(shorter - prefix)
        .take_while(|(a, b)| a == b)
        .count();

    Some(TextEdit {
        start: prefix,
        delete_len: old_chars.len() - prefix - suffix,
        insert: new_chars[prefix..new_chars.len() - suffix].iter().collect(),
    })
}
