//! `appd-regress trend` command implementation.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use appd_regress::paths::{short_name, DEFAULT_THRESHOLD_METRIC};
use appd_regress::{trend, BuildReport, GateConfig};

use super::EXIT_SUCCESS;
use crate::store::HistoryStore;

/// Width of the widest bar in the trend chart.
const BAR_WIDTH: f64 = 40.0;

/// Execute the `trend` command.
///
/// Prints one row per stored build that has data for the metric, with a
/// bar scaled to the largest average.
pub fn execute(config_path: &Path, metric: Option<String>, history_dir: &Path) -> Result<ExitCode> {
    let metric = match metric {
        Some(metric) => metric,
        None => GateConfig::load(config_path)
            .map(|c| c.gate.resolved_threshold_metric())
            .unwrap_or_else(|_| DEFAULT_THRESHOLD_METRIC.to_string()),
    };

    let store = HistoryStore::new(history_dir);
    let entries: Vec<BuildReport> = store
        .history(None)?
        .into_iter()
        .map(|(id, report)| BuildReport::new(id, report.as_ref().clone()))
        .collect();
    let points = trend(&entries, &metric);

    println!("{}", short_name(&metric));
    if points.is_empty() {
        println!("  no data for {metric} in {}", history_dir.display());
        return Ok(ExitCode::from(EXIT_SUCCESS));
    }

    let max = points.iter().map(|p| p.average).fold(0.0_f64, f64::max);
    for point in &points {
        let width = if max > 0.0 {
            (point.average / max * BAR_WIDTH).round() as usize
        } else {
            0
        };
        println!(
            "  #{:<6} {:>12.2}  {}",
            point.build_id,
            point.average,
            "█".repeat(width)
        );
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}
