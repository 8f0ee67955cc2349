//! Unified diffs between backed-up and rendered configuration.
//!
//! # Example
//!
//! ```rust
//! use netauto::diff::unified_diff;
//!
//! let diff = unified_diff("a\nb\n", "a\nc\n", "backup", "rendered", 3);
//! assert!(diff.contains("-b"));
//! assert!(diff.contains("+c"));
//! ```

use colored::Colorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// Counts of changed lines between two texts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    /// Lines only present in the new text
    pub insertions: usize,
    /// Lines only present in the old text
    pub deletions: usize,
    /// Number of hunks
    pub hunks: usize,
}

impl DiffStats {
    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.insertions > 0 || self.deletions > 0
    }

    /// One-line summary, e.g. `2 insertions(+), 1 deletion(-)`.
    pub fn summary(&self) -> String {
        format!(
            "{} insertion{}(+), {} deletion{}(-)",
            self.insertions,
            if self.insertions == 1 { "" } else { "s" },
            self.deletions,
            if self.deletions == 1 { "" } else { "s" },
        )
    }
}

/// Unified diff of `old` → `new`, with `---`/`+++` headers.
///
/// Returns an empty string when the texts are equal.
pub fn unified_diff(
    old: &str,
    new: &str,
    old_label: &str,
    new_label: &str,
    context_lines: usize,
) -> String {
    if old == new {
        return String::new();
    }
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(context_lines)
        .header(old_label, new_label)
        .to_string()
}

/// Compute change statistics.
pub fn compute_stats(old: &str, new: &str) -> DiffStats {
    let diff = TextDiff::from_lines(old, new);
    let mut stats = DiffStats::default();

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => stats.insertions += 1,
            ChangeTag::Delete => stats.deletions += 1,
            ChangeTag::Equal => {}
        }
    }
    stats.hunks = diff.unified_diff().iter_hunks().count();

    stats
}

/// Color a unified diff for terminal output.
pub fn colorize(diff: &str) -> String {
    diff.lines()
        .map(|line| {
            if line.starts_with("---") {
                line.red().bold().to_string()
            } else if line.starts_with("+++") {
                line.green().bold().to_string()
            } else if line.starts_with("@@") {
                line.cyan().to_string()
            } else if line.starts_with('-') {
                line.red().to_string()
            } else if line.starts_with('+') {
                line.green().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unified_diff_headers_and_changes() {
        let diff = unified_diff(
            "router ospf\n network 10.0.1.0/24 area 0\n",
            "router ospf\n network 10.0.9.0/24 area 0\n",
            "out/r1.ospf.backup",
            "out/r1.ospf.rendered",
            3,
        );
        assert!(diff.starts_with("--- out/r1.ospf.backup\n+++ out/r1.ospf.rendered\n"));
        assert!(diff.contains("- network 10.0.1.0/24 area 0"));
        assert!(diff.contains("+ network 10.0.9.0/24 area 0"));
    }

    #[test]
    fn test_equal_texts_have_empty_diff() {
        assert_eq!(unified_diff("same\n", "same\n", "a", "b", 3), "");
        assert!(!compute_stats("same\n", "same\n").has_changes());
    }

    #[test]
    fn test_stats() {
        let stats = compute_stats("line1\nline2\nline3\n", "line1\nmodified\nline3\n");
        assert_eq!(stats.insertions, 1);
        assert_eq!(stats.deletions, 1);
        assert_eq!(stats.hunks, 1);
        assert_eq!(stats.summary(), "1 insertion(+), 1 deletion(-)");
    }

    #[test]
    fn test_colorize_keeps_text_without_color() {
        colored::control::set_override(false);
        let diff = "--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y";
        assert_eq!(colorize(diff), diff);
        colored::control::unset_override();
    }
}
