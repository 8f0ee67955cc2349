//! Counters derived from raw `vtysh` output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::collect::Snapshot;

static LEGEND_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]\s*-\s").expect("valid legend regex"));
static FULL_STATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bFull\b").expect("valid state regex"));

/// Count OSPF routes in `show ip route` output.
///
/// A route line starts with the `O` protocol code (`O`, `O>*`, ...). The
/// `Codes:` header and legend lines such as `O - OSPF` are skipped.
pub fn count_ospf_routes(text: &str) -> usize {
    text.lines()
        .map(str::trim_start)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("Codes:"))
        .filter(|line| !LEGEND_LINE.is_match(line))
        .filter(|line| line.starts_with('O'))
        .count()
}

/// Count `(total, full)` neighbors in `show ip ospf neighbor` output.
///
/// Each data row holds at least a neighbor id and a state. The header row and
/// one-token lines are not neighbors.
pub fn count_neighbors(text: &str) -> (usize, usize) {
    let mut total = 0;
    let mut full = 0;
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if line.contains("Neighbor ID") && line.contains("State") {
            continue;
        }
        if line.split_whitespace().count() < 2 {
            continue;
        }
        total += 1;
        if FULL_STATE.is_match(line) {
            full += 1;
        }
    }
    (total, full)
}

/// Counters of one host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeMetrics {
    /// OSPF routes
    pub routes: usize,
    /// OSPF neighbors in any state
    pub neighbors: usize,
    /// Neighbors in Full state
    pub full: usize,
}

/// Counters of a whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// Per-host counters, sorted by host id
    pub nodes: Vec<(String, NodeMetrics)>,
    /// Sum of routes
    pub total_routes: usize,
    /// Sum of neighbors
    pub total_neighbors: usize,
    /// Sum of Full neighbors
    pub total_full: usize,
}

/// Compute per-host counters and totals.
pub fn aggregate(snapshot: &Snapshot) -> Metrics {
    let mut metrics = Metrics::default();
    let mut hosts: Vec<_> = snapshot.iter().collect();
    hosts.sort_by(|a, b| a.0.cmp(b.0));

    for (host, state) in hosts {
        let (neighbors, full) = count_neighbors(&state.ospf);
        let node = NodeMetrics {
            routes: count_ospf_routes(&state.routes),
            neighbors,
            full,
        };
        metrics.total_routes += node.routes;
        metrics.total_neighbors += node.neighbors;
        metrics.total_full += node.full;
        metrics.nodes.push((host.clone(), node));
    }
    metrics
}
