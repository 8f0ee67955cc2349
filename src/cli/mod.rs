//! CLI module for Netauto
//!
//! This module provides the command-line interface for Netauto,
//! including argument parsing and subcommand handling.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Netauto - lab validation for containerlab/FRR router networks
///
/// Detects configuration drift, collects routing state and maintains a
/// Markdown health report.
#[derive(Parser, Debug, Clone)]
#[command(name = "netauto")]
#[command(author = "Netauto Contributors")]
#[command(version)]
#[command(about = "Lab validation for containerlab/FRR router networks", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "NETAUTO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compare rendered intent with backed-up configurations
    Drift(commands::drift::DriftArgs),

    /// Render the intended configuration of one host
    Render(commands::render::RenderArgs),

    /// Collect routing and OSPF state into a JSON snapshot
    Collect(commands::collect::CollectArgs),

    /// Build or refresh the Markdown health report
    Report(commands::report::ReportArgs),

    /// Run lab health probes
    Probe(commands::probe::ProbeArgs),

    /// List the hosts that would be checked
    #[command(name = "list-hosts")]
    ListHosts(commands::hosts::ListHostsArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }

    /// Check if JSON output is requested
    pub fn is_json(&self) -> bool {
        matches!(self.output, OutputFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["netauto", "drift"]).unwrap();
        assert!(matches!(cli.command, Commands::Drift(_)));

        let cli = Cli::try_parse_from(["netauto", "list-hosts"]).unwrap();
        assert!(matches!(cli.command, Commands::ListHosts(_)));
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["netauto", "-vvvvv", "collect"]).unwrap();
        assert_eq!(cli.verbosity(), 3);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "netauto",
            "report",
            "--output",
            "json",
            "--no-color",
            "-c",
            "lab.toml",
        ])
        .unwrap();
        assert!(cli.is_json());
        assert!(cli.no_color);
        assert_eq!(cli.config, Some(PathBuf::from("lab.toml")));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["netauto", "deploy"]).is_err());
    }
}
