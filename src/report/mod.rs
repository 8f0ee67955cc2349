//! Health report aggregation.
//!
//! The report combines three inputs into a Markdown document:
//!
//! - a state [`Snapshot`] from the collector, reduced to route and neighbor
//!   counters by [`metrics`],
//! - a JUnit results file summarized by [`junit`],
//! - the drift verdict of the pipeline, passed in as a string signal.
//!
//! # Example
//!
//! ```rust,no_run
//! use netauto::collect::Snapshot;
//! use netauto::report::{DriftStatus, Report, TestSummary};
//! use std::path::Path;
//!
//! let snapshot = Snapshot::load(Path::new("out/routes.json"));
//! let tests = TestSummary::from_junit(Path::new("tests/artifacts/junit.xml"));
//! let report = Report::new(snapshot, tests, DriftStatus::from_signal(Some("0")));
//! report.write(Path::new("docs/report.md")).unwrap();
//! ```

pub mod junit;
pub mod markdown;
pub mod metrics;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

use crate::collect::Snapshot;
use crate::error::Result;

pub use junit::TestSummary;
pub use markdown::{build_detail, build_summary, merge_summary, SummaryInput, SEPARATOR, SUMMARY_MARK};
pub use metrics::{aggregate, count_neighbors, count_ospf_routes, Metrics, NodeMetrics};

/// Environment variable carrying the drift verdict.
pub const DRIFT_STATUS_ENV: &str = "DRIFT_STATUS";
/// Environment variable carrying the commit id.
pub const COMMIT_ENV: &str = "GITHUB_SHA";

/// Verdict of the drift check as seen by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftStatus {
    /// Intended and actual configuration match.
    NoDrift,
    /// At least one host drifted.
    DriftDetected,
    /// No usable signal.
    Unknown,
}

impl DriftStatus {
    /// Interpret a drift signal such as an exit status or a word.
    pub fn from_signal(signal: Option<&str>) -> Self {
        let value = signal.unwrap_or_default().trim().to_lowercase();
        match value.as_str() {
            "0" | "ok" | "true" | "clean" | "pass" | "passed" => DriftStatus::NoDrift,
            "1" | "drift" | "false" | "dirty" | "fail" | "failed" => DriftStatus::DriftDetected,
            _ => DriftStatus::Unknown,
        }
    }

    /// Read the signal from `DRIFT_STATUS`.
    pub fn from_env() -> Self {
        Self::from_signal(std::env::var(DRIFT_STATUS_ENV).ok().as_deref())
    }

    /// Table cell text.
    pub fn label(&self) -> &'static str {
        match self {
            DriftStatus::NoDrift => "✅ No drift",
            DriftStatus::DriftDetected => "❌ Drift detected",
            DriftStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DriftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Abbreviate a commit id to its first seven characters.
pub fn short_commit(sha: &str) -> String {
    sha.trim().chars().take(7).collect()
}

/// A health report ready to be rendered.
#[derive(Debug, Clone)]
pub struct Report {
    snapshot: Snapshot,
    metrics: Metrics,
    tests: TestSummary,
    drift: DriftStatus,
    commit: String,
    generated_at: DateTime<Utc>,
}

impl Report {
    /// Build a report stamped with the current time.
    pub fn new(snapshot: Snapshot, tests: TestSummary, drift: DriftStatus) -> Self {
        let metrics = aggregate(&snapshot);
        Self {
            snapshot,
            metrics,
            tests,
            drift,
            commit: String::new(),
            generated_at: Utc::now(),
        }
    }

    /// Attach a commit id (abbreviated).
    pub fn with_commit(mut self, sha: &str) -> Self {
        self.commit = short_commit(sha);
        self
    }

    /// Attach the commit id from `GITHUB_SHA`, if set.
    pub fn with_commit_from_env(self) -> Self {
        let sha = std::env::var(COMMIT_ENV).unwrap_or_default();
        self.with_commit(&sha)
    }

    /// Override the generation time.
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = at;
        self
    }

    /// Aggregated counters.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Test summary.
    pub fn tests(&self) -> &TestSummary {
        &self.tests
    }

    /// Drift verdict.
    pub fn drift(&self) -> DriftStatus {
        self.drift
    }

    /// The summary block.
    pub fn summary(&self) -> String {
        build_summary(&SummaryInput {
            metrics: &self.metrics,
            tests: &self.tests,
            drift: self.drift,
            commit: &self.commit,
            generated_at: self.generated_at,
        })
    }

    /// The detail block.
    pub fn detail(&self) -> String {
        build_detail(&self.snapshot)
    }

    /// Render the document, merging into `existing` when given.
    ///
    /// Without a previous report, or when the previous detail is blank, the
    /// detail is regenerated from the snapshot. Otherwise only the summary is
    /// replaced.
    pub fn render(&self, existing: Option<&str>) -> String {
        let summary = self.summary();
        match existing {
            Some(text) if !text.trim().is_empty() => {
                let keep = markdown::preserved_detail(text).unwrap_or_default();
                if text.starts_with(SUMMARY_MARK) && keep.trim().is_empty() {
                    debug!("existing report has no detail, regenerating it");
                    summary + &self.detail()
                } else {
                    merge_summary(&summary, text)
                }
            }
            _ => summary + &self.detail(),
        }
    }

    /// Render into `path`, replacing its summary block in place.
    pub fn write(&self, path: &Path) -> Result<()> {
        let existing = match std::fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.render(existing.as_deref()))?;
        info!(path = %path.display(), "wrote report");
        Ok(())
    }
}
