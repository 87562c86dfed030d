use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\p{Cc}]+").unwrap());

/// Canonicalize whitespace: control characters count as whitespace, runs
/// collapse to a single space, and the ends are trimmed.
///
/// The output is never longer than the input, and empty input stays empty.
pub fn normalize(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}
