//! Shared utility functions.

/// Keep at most `max_chars` characters of `s`.
///
/// Returns a sub-slice of the original string, so multi-byte text is never
/// split inside a character. If the string is shorter, it is returned unchanged.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
