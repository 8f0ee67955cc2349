//! Extraction of configuration sub-sections.
//!
//! FRR writes each block of `show running-config` followed by a line holding a
//! lone `!`. A section is everything from the first line matching a start
//! pattern up to (not including) the next such terminator.

use once_cell::sync::Lazy;
use regex::Regex;

/// Start of the OSPF routing-protocol block.
pub static OSPF_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^router ospf\b").expect("valid OSPF start regex"));

static SECTION_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*!\s*$").expect("valid section terminator regex"));

/// Return the block of `text` that begins at the first match of `start`.
///
/// Returns an empty string when `start` does not match. Without a terminator
/// the block runs to the end of the text.
pub fn extract_section(text: &str, start: &Regex) -> String {
    let Some(m) = start.find(text) else {
        return String::new();
    };
    let begin = m.start();

    // Search strictly after the match start so a terminator-shaped start line
    // cannot end its own block.
    let search_from = next_char_boundary(text, begin);
    let end = SECTION_END
        .find_at(text, search_from)
        .map(|t| t.start())
        .unwrap_or(text.len());

    text[begin..end].to_string()
}

/// Extract the `router ospf` block.
pub fn extract_ospf(text: &str) -> String {
    extract_section(text, &OSPF_START)
}

fn next_char_boundary(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map(|c| at + c.len_utf8())
        .unwrap_or(text.len())
}
