//! Text helpers for presentation.

/// Length of post excerpts in list views.
pub const EXCERPT_LEN: usize = 160;

/// Preview of `text`: trimmed, and cut to `len` characters followed by `...`
/// when longer.
#[must_use]
pub fn excerpt(text: &str, len: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(len) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
