//! Subcommands module for Netauto CLI
//!
//! This module contains all the subcommand implementations.

pub mod collect;
pub mod drift;
pub mod hosts;
pub mod probe;
pub mod render;
pub mod report;

use crate::cli::output::OutputFormatter;
use anyhow::{Context, Result};
use netauto::config::Config;

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Verbosity level
    pub verbosity: u8,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli, config: Config) -> Self {
        let use_color = !cli.no_color && config.colors.enabled;
        let output = OutputFormatter::new(use_color, cli.is_json(), cli.verbosity());

        Self {
            config,
            output,
            verbosity: cli.verbosity(),
        }
    }

    /// Hosts to operate on: the explicit list when given, otherwise the
    /// configured host source.
    pub fn hosts(&self, explicit: &[String]) -> Result<Vec<String>> {
        if !explicit.is_empty() {
            return Ok(explicit.to_vec());
        }
        self.config
            .host_source()
            .resolve()
            .context("Failed to enumerate hosts")
    }
}
