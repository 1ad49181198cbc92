//! Text normalization helpers shared by the fetcher and the extractor.

use regex::Regex;
use std::sync::OnceLock;

fn blank_line_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("static pattern is valid"))
}

/// Collapses runs of three or more newlines to a single blank line, so the
/// output reads as blank-line-separated paragraphs.
#[must_use]
pub fn collapse_blank_lines(text: &str) -> String {
    blank_line_runs().replace_all(text.trim(), "\n\n").into_owned()
}

/// Truncates `text` to at most `max_chars` characters, respecting char
/// boundaries. Returns the input untouched when it already fits.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
