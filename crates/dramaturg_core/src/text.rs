//! Text helpers shared by prompt construction and reporting.

/// Truncate `text` to at most `max_chars` characters on a char boundary.
///
/// # Examples
///
/// ```
/// use dramaturg_core::truncate_chars;
///
/// assert_eq!(truncate_chars("مرحبا بالعالم", 5), "مرحبا");
/// assert_eq!(truncate_chars("short", 100), "short");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_char_boundaries() {
        let text = "أ".repeat(10);
        assert_eq!(truncate_chars(&text, 3).chars().count(), 3);
    }

    #[test]
    fn truncate_zero_is_empty() {
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn counts_words() {
        assert_eq!(word_count("  one two\nthree "), 3);
    }
}
