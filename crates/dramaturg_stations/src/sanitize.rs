//! Markdown stripping for the plain-text final report.

use regex::Regex;
use std::sync::LazyLock;

/// Ordered rewrite rules: pattern and replacement.
static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?m)^[ \t]*```[A-Za-z0-9_-]*[ \t]*(\n|$)", ""),
        (r"(?m)^[ \t]{0,3}#{1,6}[ \t]*", ""),
        (r"(?m)^([ \t]*)[-*+][ \t]+", "$1"),
        (r"(?m)^([ \t]*)\d+[.)][ \t]+", "$1"),
        (r"\*\*(.+?)\*\*", "$1"),
        (r"__(.+?)__", "$1"),
        (r"\*([^*\n]+)\*", "$1"),
        (r"(^|[\s(])_([^_\n]+)_([\s).,;:!?]|$)", "$1$2$3"),
        (r"`([^`\n]*)`", "$1"),
        (r"\n[ \t]*\n([ \t]*\n)+", "\n\n"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Strip markdown from model prose, leaving plain paragraphs.
///
/// Removes code fences, inline code ticks, headings, list markers and
/// emphasis, and collapses runs of three or more line breaks into one blank
/// line.
///
/// # Examples
///
/// ```
/// use dramaturg_stations::sanitize_plain_text;
///
/// let text = "## Verdict\n\n- **Strong** opening\n1. Weak `middle`";
/// assert_eq!(sanitize_plain_text(text), "Verdict\n\nStrong opening\nWeak middle");
/// ```
pub fn sanitize_plain_text(text: &str) -> String {
    let mut text = text.replace("\r\n", "\n");
    for (pattern, replacement) in RULES.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences_but_keeps_code() {
        let text = "Intro\n```text\nline one\n```\nOutro";
        assert_eq!(sanitize_plain_text(text), "Intro\nline one\nOutro");
    }

    #[test]
    fn strips_emphasis_variants() {
        assert_eq!(
            sanitize_plain_text("A __bold__ and *soft* and _quiet_ word"),
            "A bold and soft and quiet word"
        );
    }

    #[test]
    fn mismatched_strong_delimiters_are_kept() {
        assert_eq!(sanitize_plain_text("a **bold__ claim"), "a **bold__ claim");
        assert_eq!(sanitize_plain_text("a __bold** claim"), "a __bold** claim");
    }

    #[test]
    fn keeps_snake_case_identifiers() {
        assert_eq!(sanitize_plain_text("see station_report_file"), "see station_report_file");
    }

    #[test]
    fn collapses_blank_runs() {
        assert_eq!(sanitize_plain_text("one\n\n\n\n\ntwo\n \n\nthree"), "one\n\ntwo\n\nthree");
    }

    #[test]
    fn arabic_text_survives() {
        let text = "# التقرير النهائي\n\n* **الشخصيات** متماسكة";
        assert_eq!(sanitize_plain_text(text), "التقرير النهائي\n\nالشخصيات متماسكة");
    }
}
