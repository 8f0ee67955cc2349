//! Netauto - lab validation for containerlab/FRR router networks
//!
//! This is the main entry point for the Netauto CLI.

mod cli;

use clap::Parser;
use cli::commands::CommandContext;
use cli::{Cli, Commands};
use netauto::config::{Config, LoggingConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config = match Config::load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(cli.verbosity(), &LoggingConfig::default());
            eprintln!("ERROR: Failed to load config: {:#}", e);
            std::process::exit(2);
        }
    };

    // Initialize logging based on verbosity
    init_logging(cli.verbosity(), &config.logging);

    // Display version if verbose
    if cli.verbosity() >= 2 {
        eprintln!("Netauto v{} by {}", VERSION, AUTHORS);
    }

    // Create command context
    let mut ctx = CommandContext::new(&cli, config);

    // Execute the appropriate command
    let result = match &cli.command {
        Commands::Drift(args) => args.execute(&mut ctx).await,
        Commands::Render(args) => args.execute(&mut ctx).await,
        Commands::Collect(args) => args.execute(&mut ctx).await,
        Commands::Report(args) => args.execute(&mut ctx).await,
        Commands::Probe(args) => args.execute(&mut ctx).await,
        Commands::ListHosts(args) => args.execute(&mut ctx).await,
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            ctx.output.error(&format!("{:#}", e));
            1
        }
    };

    ctx.output.flush();
    std::process::exit(exit_code);
}

/// Initialize logging based on verbosity level
///
/// `RUST_LOG` wins; otherwise `-v` raises the configured level.
fn init_logging(verbosity: u8, logging: &LoggingConfig) {
    let filter = match verbosity {
        0 => logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so stdout stays machine-readable
    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(verbosity >= 3),
            )
            .with(env_filter)
            .init();
    }
}
