//! appd-regress: AppDynamics build regression gate for CI pipelines
//!
//! Fetches the metrics of a build window from an AppDynamics controller,
//! compares them with the builds stored in a history directory and maps the
//! verdict onto the process exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod store;
mod summary;

/// AppDynamics build regression gate
#[derive(Parser)]
#[command(name = "appd-regress")]
#[command(about = "Gate CI builds on AppDynamics performance metrics", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "appd-regress.toml")]
    config: PathBuf,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(commands::EXIT_FAILURE)
        },
    }
}

fn execute(cli: Cli) -> Result<ExitCode> {
    cli.command.execute(&cli.config)
}

/// Log to stderr, `info` unless `RUST_LOG` says otherwise.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
