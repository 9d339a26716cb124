//! Growth - Growth analytics dashboard
//!
//! # Usage
//!
//! ```bash
//! # Run the dashboard API (default)
//! growth
//! growth serve --config configs/growth.toml
//!
//! # Print one dashboard as JSON
//! growth dashboard --range 30d --period daily
//!
//! # Check configuration and warehouse access
//! growth check
//! ```

mod bootstrap;
mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use growth_config::{LogFormat, LogLevel};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Growth - Growth analytics dashboard
#[derive(Parser, Debug)]
#[command(name = "growth")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: configs/growth.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the dashboard API server
    Serve,

    /// Build one dashboard and print it as JSON
    Dashboard(cmd::dashboard::DashboardArgs),

    /// Validate configuration and check the data source
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = bootstrap::load_config(cli.config.as_deref())?;

    let directive = config.log.filter_directive(cli.log_level);
    init_logging(&directive, config.log.format)?;

    match cli.command {
        Some(Command::Dashboard(args)) => cmd::dashboard::run(&config, args).await,
        Some(Command::Check) => cmd::check::run(&config).await,
        // No subcommand = run server (default behavior)
        Some(Command::Serve) | None => cmd::serve::run(&config).await,
    }
}

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr so `growth dashboard` output stays pipeable.
fn init_logging(directive: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(directive)
        .map_err(|e| anyhow::anyhow!("invalid log filter '{}': {}", directive, e))?;

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Console => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}
