//! `appd-regress check` command implementation.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use appd_regress::{MetricSource, RestMetricSource};
use colored::Colorize;

use super::{load_config, EXIT_FAILURE, EXIT_SUCCESS};

/// Execute the `check` command.
///
/// Validates the controller credentials and looks up the configured
/// application.
pub async fn execute(config_path: &Path, password: Option<String>) -> Result<ExitCode> {
    let config = load_config(config_path, password)?;
    config.controller.validate_credentials()?;

    let source = RestMetricSource::from_settings(&config.controller)
        .context("Failed to create HTTP client")?;

    eprintln!("Checking {} ...", source.application_uri());
    if !source.validate_connection().await {
        println!("{} cannot connect to {}", "FAILED".red().bold(), source.controller_uri());
        return Ok(ExitCode::from(EXIT_FAILURE));
    }

    match source.fetch_application_info().await {
        Some(app) => println!(
            "{} connected, application '{}' has id {}",
            "OK".green().bold(),
            app.name,
            app.id
        ),
        None => println!(
            "{} connected, but application '{}' was not listed; reports will have no controller links",
            "OK".yellow().bold(),
            config.controller.application
        ),
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}
