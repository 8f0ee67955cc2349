//! Markdown rendering of the health report.
//!
//! A report is a summary block followed by a detail block:
//!
//! ```text
//! ## Netauto Health Summary (2024-05-01 12:00:00 UTC)
//! ...tables...
//! ---
//! ## clab-netauto-r1
//! ### OSPF Neighbors
//! ...
//! ```
//!
//! Re-running the report only swaps the summary block. Everything after the
//! first separator is kept byte for byte.

use chrono::{DateTime, Utc};

use super::junit::TestSummary;
use super::metrics::Metrics;
use super::DriftStatus;
use crate::collect::Snapshot;

/// First characters of every summary block.
pub const SUMMARY_MARK: &str = "## Netauto Health Summary (";
/// Line closing the summary block.
pub const SEPARATOR: &str = "\n---\n";
/// Shortest code fence used for raw device output.
pub const MIN_FENCE: usize = 6;

/// Everything the summary block shows.
#[derive(Debug, Clone, Copy)]
pub struct SummaryInput<'a> {
    /// Aggregated device metrics
    pub metrics: &'a Metrics,
    /// Test results
    pub tests: &'a TestSummary,
    /// Drift verdict
    pub drift: DriftStatus,
    /// Abbreviated commit id, may be empty
    pub commit: &'a str,
    /// Generation time
    pub generated_at: DateTime<Utc>,
}

/// Render the summary block, separator included.
pub fn build_summary(input: &SummaryInput<'_>) -> String {
    let m = input.metrics;
    let t = input.tests;
    let mut lines = vec![
        format!(
            "{}{})\n",
            SUMMARY_MARK,
            input.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        "| Metric | Value |".to_string(),
        "|---|---|".to_string(),
        format!("| OSPF Neighbors (Full) | {}/{} |", m.total_full, m.total_neighbors),
        format!("| OSPF Routes (Total) | {} |", m.total_routes),
        format!("| Pytest Passed/Failed | {}/{} |", t.passed, t.failed()),
        format!("| Pytest Skipped | {} |", t.skipped),
        format!("| Drift | {} |", input.drift.label()),
        format!("| Commit | `{}` |", input.commit),
        "\n### Node Breakdown".to_string(),
        "| Node | OSPF Full | OSPF Neigh (all) | OSPF Routes |".to_string(),
        "|------|-----------|------------------|-------------|".to_string(),
    ];
    for (host, node) in &m.nodes {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            host, node.full, node.neighbors, node.routes
        ));
    }
    lines.join("\n") + SEPARATOR
}

/// Render one section per host, sorted by host id.
pub fn build_detail(snapshot: &Snapshot) -> String {
    let mut hosts: Vec<_> = snapshot.iter().collect();
    hosts.sort_by(|a, b| a.0.cmp(b.0));

    let mut lines: Vec<String> = Vec::new();
    for (host, state) in hosts {
        let ospf = state.ospf.trim();
        let routes = state.routes.trim();
        let fence = fence_for(&[ospf, routes]);
        lines.extend([
            format!("## {}", host),
            "### OSPF Neighbors".to_string(),
            fence.clone(),
            ospf.to_string(),
            fence.clone(),
            "### Routes".to_string(),
            fence.clone(),
            routes.to_string(),
            fence,
            String::new(),
        ]);
    }
    lines.join("\n")
}

/// A backtick fence longer than any backtick run in `contents`.
pub fn fence_for(contents: &[&str]) -> String {
    let longest = contents
        .iter()
        .map(|c| longest_backtick_run(c))
        .max()
        .unwrap_or(0);
    "`".repeat(MIN_FENCE.max(longest + 1))
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Put `summary` in front of `existing`, replacing an old summary block.
pub fn merge_summary(summary: &str, existing: &str) -> String {
    if !existing.starts_with(SUMMARY_MARK) {
        return format!("{}{}", summary, existing);
    }
    match existing.split_once(SEPARATOR) {
        Some((_, detail)) => format!("{}{}", summary, detail),
        None => summary.to_string(),
    }
}

/// Detail text that `merge_summary` would keep from `existing`.
pub fn preserved_detail(existing: &str) -> Option<&str> {
    if !existing.starts_with(SUMMARY_MARK) {
        return Some(existing);
    }
    existing.split_once(SEPARATOR).map(|(_, detail)| detail)
}
