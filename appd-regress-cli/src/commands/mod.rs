//! `appd-regress` subcommands.

mod check;
mod init;
mod paths;
mod run;
mod trend;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use appd_regress::{BuildResult, GateConfig};
use clap::Subcommand;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_UNSTABLE: u8 = 1;
pub const EXIT_FAILURE: u8 = 2;

/// Directory holding one `build-{id}.json` per evaluated build.
const DEFAULT_HISTORY_DIR: &str = ".appd-regress/history";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a starter configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// List the metric paths that can serve as threshold metric
    Paths,

    /// Check the connection to the AppDynamics controller
    Check {
        /// Controller password (overrides the configuration file)
        #[arg(long, env = "APPD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Evaluate a build against the stored history
    ///
    /// Fetches the metrics of the build window, compares the threshold
    /// metric with the average of earlier builds and stores the report.
    /// Exits with 0 for success, 1 for unstable and 2 for failure.
    Run {
        /// Number of the build being evaluated
        #[arg(long)]
        build_id: u64,

        /// Build start as epoch milliseconds or RFC 3339 timestamp
        #[arg(long, value_parser = parse_build_start)]
        build_start: i64,

        /// Result of the build before this step
        #[arg(long, default_value = "SUCCESS")]
        previous_result: BuildResult,

        /// Directory with the reports of earlier builds
        #[arg(long, default_value = DEFAULT_HISTORY_DIR)]
        history_dir: PathBuf,

        /// Do not store the report of this build
        #[arg(long)]
        no_store: bool,

        /// Controller password (overrides the configuration file)
        #[arg(long, env = "APPD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Show the per-build averages of a metric
    Trend {
        /// Metric path (defaults to the configured threshold metric)
        #[arg(long)]
        metric: Option<String>,

        /// Directory with the reports of earlier builds
        #[arg(long, default_value = DEFAULT_HISTORY_DIR)]
        history_dir: PathBuf,
    },
}

impl Command {
    /// Execute the selected subcommand.
    pub fn execute(self, config_path: &Path) -> Result<ExitCode> {
        match self {
            Command::Init { force } => init::execute(config_path, force),
            Command::Paths => paths::execute(config_path),
            Command::Check { password } => {
                let runtime = tokio::runtime::Runtime::new()?;
                runtime.block_on(check::execute(config_path, password))
            },
            Command::Run {
                build_id,
                build_start,
                previous_result,
                history_dir,
                no_store,
                password,
            } => {
                let runtime = tokio::runtime::Runtime::new()?;
                runtime.block_on(run::execute(run::RunArgs {
                    config_path,
                    build_id,
                    build_start,
                    previous_result,
                    history_dir,
                    no_store,
                    password,
                }))
            },
            Command::Trend {
                metric,
                history_dir,
            } => trend::execute(config_path, metric, &history_dir),
        }
    }
}

/// Loads the configuration and applies a password override.
fn load_config(config_path: &Path, password: Option<String>) -> Result<GateConfig> {
    if !config_path.exists() {
        anyhow::bail!(
            "Config file not found: {}\nUse `appd-regress init` to create one.",
            config_path.display()
        );
    }
    let mut config = GateConfig::load(config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;
    if let Some(password) = password {
        config.controller.password = password;
    }
    Ok(config)
}

/// Maps a build result onto the process exit code.
pub fn exit_code(result: BuildResult) -> u8 {
    match result {
        BuildResult::Success => EXIT_SUCCESS,
        BuildResult::Unstable => EXIT_UNSTABLE,
        BuildResult::Failure | BuildResult::NotBuilt | BuildResult::Aborted => EXIT_FAILURE,
    }
}

fn parse_build_start(value: &str) -> Result<i64, String> {
    if let Ok(millis) = value.parse::<i64>() {
        return Ok(millis);
    }
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|t| t.timestamp_millis())
        .map_err(|e| format!("expected epoch milliseconds or RFC 3339 timestamp: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_start_accepts_both_formats() {
        assert_eq!(parse_build_start("1700000000000").unwrap(), 1_700_000_000_000);
        assert_eq!(
            parse_build_start("2023-11-14T22:13:20Z").unwrap(),
            1_700_000_000_000
        );
        assert!(parse_build_start("yesterday").is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(BuildResult::Success), 0);
        assert_eq!(exit_code(BuildResult::Unstable), 1);
        assert_eq!(exit_code(BuildResult::Failure), 2);
        assert_eq!(exit_code(BuildResult::Aborted), 2);
    }
}
