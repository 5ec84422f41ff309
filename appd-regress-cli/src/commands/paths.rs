//! `appd-regress paths` command implementation.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use appd_regress::paths::{selectable_metric_labels, CUSTOM_METRIC_LABEL, DEFAULT_THRESHOLD_METRIC};
use appd_regress::GateConfig;
use colored::Colorize;

use super::EXIT_SUCCESS;

/// Execute the `paths` command.
///
/// Lists every label accepted as `threshold_metric`. When a configuration
/// file is present, the configured metric is highlighted and the custom
/// label shows the path it resolves to.
pub fn execute(config_path: &Path) -> Result<ExitCode> {
    let settings = GateConfig::load(config_path).ok().map(|c| c.gate);
    let selected = settings
        .as_ref()
        .map(|s| s.threshold_metric.clone())
        .unwrap_or_else(|| DEFAULT_THRESHOLD_METRIC.to_string());

    for (i, label) in selectable_metric_labels().into_iter().enumerate() {
        let marker = if label == selected { "*" } else { " " };
        let line = match (&settings, label) {
            (Some(s), CUSTOM_METRIC_LABEL) => format!("{label} ({})", s.custom_metric_path),
            _ => label.to_string(),
        };
        if label == selected {
            println!("{marker} {:>2}. {}", i + 1, line.bold());
        } else {
            println!("{marker} {:>2}. {line}", i + 1);
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}
