//! `appd-regress run` command implementation.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use appd_regress::{BuildGate, BuildResult, RestMetricSource};
use tracing::info;

use super::{exit_code, load_config};
use crate::store::HistoryStore;
use crate::summary::render_outcome;

pub struct RunArgs<'a> {
    pub config_path: &'a Path,
    pub build_id: u64,
    pub build_start: i64,
    pub previous_result: BuildResult,
    pub history_dir: PathBuf,
    pub no_store: bool,
    pub password: Option<String>,
}

/// Execute the `run` command.
///
/// Evaluates the build against every stored build except itself, stores
/// the new report and exits with the code of the merged build result.
pub async fn execute(args: RunArgs<'_>) -> Result<ExitCode> {
    let config = load_config(args.config_path, args.password)?;
    config.controller.validate_credentials()?;

    let source = RestMetricSource::from_settings(&config.controller)
        .context("Failed to create HTTP client")?;
    let gate = BuildGate::from_settings(&config.gate);
    let threshold_metric = config.gate.resolved_threshold_metric();

    let store = HistoryStore::new(&args.history_dir);
    let history = store.history(Some(args.build_id))?;
    info!(
        builds = history.len(),
        dir = %store.dir().display(),
        "loaded build history"
    );

    let outcome = gate
        .run(
            &source,
            args.build_start,
            args.previous_result,
            history.iter().map(|(_, report)| report.as_ref()),
        )
        .await;

    let previous = history
        .iter()
        .rev()
        .find(|(id, _)| *id < args.build_id)
        .map(|(_, report)| report.as_ref());
    println!(
        "{}",
        render_outcome(args.build_id, &threshold_metric, &outcome, previous)
    );

    if let (Some(report), false) = (&outcome.report, args.no_store) {
        let path = store.save(args.build_id, report)?;
        eprintln!();
        eprintln!("Report written to: {}", path.display());
    }

    Ok(ExitCode::from(exit_code(outcome.result)))
}
