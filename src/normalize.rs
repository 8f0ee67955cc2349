//! Whitespace canonicalization for configuration comparison.

use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("valid newline regex"));

/// Canonicalize whitespace so cosmetic differences do not count as drift.
///
/// Trailing whitespace is stripped from every line, blank lines are removed
/// and the result is trimmed. The function is idempotent.
pub fn normalize(text: &str) -> String {
    let stripped = text
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_RUNS.replace_all(&stripped, "\n").trim().to_string()
}
