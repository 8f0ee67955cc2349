//! Collect command - capture routing state into a snapshot

use super::CommandContext;
use anyhow::{Context, Result};
use clap::Parser;
use netauto::collect::StateCollector;
use std::path::PathBuf;

/// Arguments for the collect command
#[derive(Parser, Debug, Clone)]
pub struct CollectArgs {
    /// Hosts to collect from (defaults to the configured host source)
    pub hosts: Vec<String>,

    /// Snapshot file to write
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Per-command timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl CollectArgs {
    /// Execute the collect command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let hosts = ctx.hosts(&self.hosts)?;
        let mut config = ctx.config.collect_config();
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }

        ctx.output.info(&format!(
            "Collecting from {} host(s) with a {}s timeout",
            hosts.len(),
            config.timeout_secs
        ));

        let factory = ctx.config.connection_factory();
        let snapshot = StateCollector::new(config).collect(&hosts, &factory).await;

        for (host, state) in snapshot.iter() {
            if state.routes.is_empty() && state.ospf.is_empty() {
                ctx.output
                    .warning(&format!("No output collected from {}", host));
            }
        }

        let path = self
            .snapshot
            .clone()
            .unwrap_or_else(|| ctx.config.paths.snapshot.clone());
        snapshot
            .save(&path)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
        ctx.output.plain(&format!("saved {}", path.display()));

        Ok(0)
    }
}
