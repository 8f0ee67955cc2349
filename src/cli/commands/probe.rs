//! Probe command - lab health checks
//!
//! Runs the configured probes with retries. Exits 1 when any probe failed.
//! With `--light` (or `CI_LIGHT=1`) every probe is reported as skipped.

use super::CommandContext;
use crate::cli::output::{CheckStatus, RecapStats};
use anyhow::Result;
use clap::Parser;
use netauto::probe::{exit_code, ProbeRunner, ProbeStatus};

/// Arguments for the probe command
#[derive(Parser, Debug, Clone)]
pub struct ProbeArgs {
    /// Skip probes (no lab available)
    #[arg(long)]
    pub light: bool,

    /// Attempts per probe
    #[arg(long)]
    pub tries: Option<u32>,
}

impl ProbeArgs {
    /// Execute the probe command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let mut policy = ctx.config.retry_policy();
        if let Some(tries) = self.tries {
            policy.attempts = tries.max(1);
        }

        let light = self.light || ProbeRunner::light_from_env();
        let runner = ProbeRunner::new(policy, ctx.config.collect.timeout_secs).light(light);
        let factory = ctx.config.connection_factory();

        let checks = &ctx.config.probe.checks;
        ctx.output.banner("LAB PROBES");
        if light {
            ctx.output.warning("Light mode: no lab available, skipping probes");
        }

        let outcomes = runner.run_all(checks, &factory).await;

        if ctx.output.is_json() {
            ctx.output
                .document(&serde_json::to_value(&outcomes)?, "");
            return Ok(exit_code(&outcomes));
        }

        let mut recap = RecapStats::new();
        for outcome in &outcomes {
            let status = match outcome.status {
                ProbeStatus::Passed => CheckStatus::Ok,
                ProbeStatus::Failed => CheckStatus::Failed,
                ProbeStatus::Skipped => CheckStatus::Skipped,
            };
            recap.record(&outcome.container, status);

            let label = outcome.probe.to_string();
            match outcome.status {
                ProbeStatus::Failed => {
                    ctx.output.host_result(&outcome.container, status, Some(&label));
                    ctx.output.error(&format!(
                        "{} failed after {} attempt(s): {}",
                        label,
                        outcome.attempts,
                        outcome.detail.trim()
                    ));
                }
                _ => ctx
                    .output
                    .host_result(&outcome.container, status, Some(&label)),
            }
        }

        ctx.output.recap(&recap);
        Ok(exit_code(&outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_args_parsing() {
        let args = ProbeArgs::try_parse_from(["probe", "--light", "--tries", "2"]).unwrap();
        assert!(args.light);
        assert_eq!(args.tries, Some(2));
    }
}
