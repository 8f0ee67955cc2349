//! Report command - refresh the Markdown health report
//!
//! The summary block of an existing report is replaced in place; everything
//! after it is kept byte for byte.

use super::CommandContext;
use anyhow::{Context, Result};
use clap::Parser;
use netauto::collect::Snapshot;
use netauto::report::{DriftStatus, Report, TestSummary};
use serde_json::json;
use std::path::PathBuf;

/// Arguments for the report command
#[derive(Parser, Debug, Clone)]
pub struct ReportArgs {
    /// Snapshot produced by `collect`
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// JUnit XML results
    #[arg(long)]
    pub junit: Option<PathBuf>,

    /// Drift verdict, e.g. the exit status of `drift` (defaults to $DRIFT_STATUS)
    #[arg(long)]
    pub drift_status: Option<String>,

    /// Commit id (defaults to $GITHUB_SHA)
    #[arg(long)]
    pub commit: Option<String>,

    /// Report file to update
    #[arg(long = "out", short = 'o')]
    pub out: Option<PathBuf>,

    /// Print the rendered report instead of writing it
    #[arg(long)]
    pub stdout: bool,
}

impl ReportArgs {
    /// Execute the report command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let paths = &ctx.config.paths;
        let snapshot_path = self.snapshot.as_ref().unwrap_or(&paths.snapshot);
        let junit_path = self.junit.as_ref().unwrap_or(&paths.junit);
        let out = self.out.as_ref().unwrap_or(&paths.report);

        let snapshot = Snapshot::load(snapshot_path);
        if snapshot.is_empty() {
            ctx.output.warning(&format!(
                "No router state in {}, counters will be zero",
                snapshot_path.display()
            ));
        }
        let tests = TestSummary::from_junit(junit_path);
        let drift = match &self.drift_status {
            Some(signal) => DriftStatus::from_signal(Some(signal)),
            None => DriftStatus::from_env(),
        };

        let report = Report::new(snapshot, tests, drift);
        let report = match &self.commit {
            Some(sha) => report.with_commit(sha),
            None => report.with_commit_from_env(),
        };

        if ctx.verbosity >= 1 && !ctx.output.is_json() {
            let rows: Vec<Vec<String>> = report
                .metrics()
                .nodes
                .iter()
                .map(|(host, node)| {
                    vec![
                        host.clone(),
                        node.routes.to_string(),
                        node.neighbors.to_string(),
                        node.full.to_string(),
                    ]
                })
                .collect();
            ctx.output.section("Node Breakdown");
            ctx.output
                .table(&["Node", "OSPF Routes", "Neighbors", "Full"], &rows);
        }

        if self.stdout {
            let existing = std::fs::read_to_string(out).ok();
            let text = report.render(existing.as_deref());
            ctx.output.document(
                &json!({
                    "metrics": report.metrics(),
                    "tests": report.tests(),
                    "drift": report.drift(),
                    "report": text,
                }),
                &text,
            );
            return Ok(0);
        }

        report
            .write(out)
            .with_context(|| format!("Failed to write report: {}", out.display()))?;

        if ctx.output.is_json() {
            ctx.output.document(
                &json!({
                    "path": out,
                    "metrics": report.metrics(),
                    "tests": report.tests(),
                    "drift": report.drift(),
                }),
                "",
            );
        } else {
            ctx.output.plain(&format!("updated {}", out.display()));
        }

        Ok(0)
    }
}
