//! List-hosts command

use super::CommandContext;
use anyhow::Result;
use clap::Parser;

/// Arguments for the list-hosts command
#[derive(Parser, Debug, Clone)]
pub struct ListHostsArgs {
    /// Show container names next to host ids
    #[arg(long)]
    pub containers: bool,
}

impl ListHostsArgs {
    /// Execute the list-hosts command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let hosts = ctx.hosts(&[])?;

        if self.containers {
            let factory = ctx.config.connection_factory();
            let rows: Vec<Vec<String>> = hosts
                .iter()
                .map(|h| vec![h.clone(), factory.container_name(h)])
                .collect();
            ctx.output.table(&["Host", "Container"], &rows);
        } else {
            ctx.output.list("Hosts", &hosts);
        }

        Ok(0)
    }
}
