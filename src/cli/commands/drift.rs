//! Drift command - intended vs. backed-up configuration
//!
//! This module implements the `drift` subcommand. It exits 0 when every host
//! matches and 1 when any host drifted or could not be checked.

use super::CommandContext;
use crate::cli::output::{CheckStatus, RecapStats};
use anyhow::{Context, Result};
use clap::Parser;
use netauto::backup::DirBackupStore;
use netauto::drift::{CompareScope, DriftChecker, HostFailure};
use netauto::vars::FileVarStore;
use std::path::PathBuf;

/// Arguments for the drift command
#[derive(Parser, Debug, Clone)]
pub struct DriftArgs {
    /// Hosts to check (defaults to the configured host source)
    pub hosts: Vec<String>,

    /// Compared part of the configuration (full, section)
    #[arg(long)]
    pub scope: Option<CompareScope>,

    /// Treat whitespace differences as drift
    #[arg(long)]
    pub strict_whitespace: bool,

    /// Directory for drift artifacts
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Template file (overrides the configured path)
    #[arg(long, short = 't')]
    pub template: Option<PathBuf>,
}

impl DriftArgs {
    /// Execute the drift command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let paths = &ctx.config.paths;

        let mut config = ctx.config.drift_config();
        if let Some(scope) = self.scope {
            config.scope = scope;
        }
        if self.strict_whitespace {
            config.ignore_whitespace = false;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }

        let template = self
            .template
            .clone()
            .unwrap_or_else(|| paths.template.clone());
        let vars = FileVarStore::new(&paths.group_vars, &paths.host_vars_dir);
        let backups = DirBackupStore::new(&paths.backups_dir)
            .with_extension(ctx.config.hosts.extension.clone());

        ctx.output.debug(&format!(
            "scope={} ignore_whitespace={} output_dir={}",
            config.scope,
            config.ignore_whitespace,
            config.output_dir.display()
        ));

        let checker =
            DriftChecker::from_template_file(&template, Box::new(vars), Box::new(backups), config)
                .with_context(|| format!("Failed to load template: {}", template.display()))?;

        let hosts = ctx.hosts(&self.hosts)?;
        ctx.output
            .info(&format!("Checking {} host(s): {}", hosts.len(), hosts.join(", ")));

        let report = checker.check(&hosts);

        if ctx.output.is_json() {
            ctx.output
                .document(&serde_json::to_value(&report)?, "");
            return Ok(report.exit_code());
        }

        let mut recap = RecapStats::new();
        for host in &hosts {
            match report.failure(host) {
                None => {
                    recap.record(host, CheckStatus::Ok);
                    if ctx.verbosity >= 1 {
                        ctx.output.host_result(host, CheckStatus::Ok, None);
                    }
                }
                Some(HostFailure::Drift) => {
                    recap.record(host, CheckStatus::Drift);
                    ctx.output.plain(&format!("[DRIFT] {} differs", host));
                    if let Some(diff) = report.diffs.get(host) {
                        ctx.output.diff(host, diff);
                    }
                    if let Some(stats) = report.stats.get(host) {
                        ctx.output.info(&format!("{}: {}", host, stats.summary()));
                    }
                }
                Some(HostFailure::Render { message }) => {
                    recap.record(host, CheckStatus::Failed);
                    ctx.output
                        .error(&format!("Template render failed for {}: {}", host, message));
                }
                Some(HostFailure::MissingBackup { path }) => {
                    recap.record(host, CheckStatus::Failed);
                    ctx.output.error(&format!(
                        "Backup not found for {}: {}",
                        host,
                        path.display()
                    ));
                }
            }
        }

        if report.is_clean() {
            let checked = report.checked();
            ctx.output.success(&format!(
                "✅ No drift found across {} host(s): {}",
                checked.len(),
                checked.join(", ")
            ));
        } else if ctx.verbosity >= 1 {
            ctx.output.recap(&recap);
        }

        for artifact in &report.artifacts {
            ctx.output.debug(&format!(
                "artifacts: {} {}",
                artifact.rendered_path.display(),
                artifact.backup_path.display()
            ));
        }

        Ok(report.exit_code())
    }
}
