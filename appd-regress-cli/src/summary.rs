//! Terminal summary of a gate run.
//!
//! [`render_outcome`] is a pure function returning the text to print, so it
//! can be tested without a terminal. Colors follow the global `colored`
//! override set by `--no-color`.

use appd_regress::{BuildResult, Classification, GateOutcome, Report};
use colored::Colorize;

/// Width for dotted row padding.
const PAD_WIDTH: usize = 24;

fn row(label: &str, value: impl std::fmt::Display) -> String {
    let dots = PAD_WIDTH.saturating_sub(label.len());
    format!("  {label}{}: {value}", ".".repeat(dots))
}

fn colored_classification(classification: Classification) -> String {
    let text = classification.to_string();
    match classification {
        Classification::Ok => text.green().bold().to_string(),
        Classification::Unstable => text.yellow().bold().to_string(),
        Classification::Failed => text.red().bold().to_string(),
    }
}

fn colored_result(result: BuildResult) -> String {
    let text = result.to_string();
    match result {
        BuildResult::Success => text.green().to_string(),
        BuildResult::Unstable => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}

/// Render the outcome of a gate run for `build_id`.
///
/// `previous` is the report of the preceding build, used for the
/// release-comparison link.
pub fn render_outcome(
    build_id: u64,
    threshold_metric: &str,
    outcome: &GateOutcome,
    previous: Option<&Report>,
) -> String {
    let mut lines = vec![
        format!("  {}  build #{build_id}", "appd-regress".bold()),
        String::new(),
        row("threshold metric", threshold_metric),
    ];

    if let Some(report) = &outcome.report {
        lines.push(row("report", report.display_name()));
        lines.push(row("metrics fetched", report.len()));
    }

    match &outcome.evaluation {
        Some(evaluation) => {
            lines.push(row("current average", format!("{:.2}", evaluation.current_average)));
            let baseline = match evaluation.baseline {
                Some(baseline) => format!(
                    "{baseline:.2} ({} builds)",
                    evaluation.baseline_reports
                ),
                None => "none".to_string(),
            };
            lines.push(row("baseline average", baseline));
            lines.push(row("score", format!("{:.1}%", evaluation.score)));
            lines.push(row(
                "classification",
                colored_classification(evaluation.classification),
            ));
        },
        None => {
            if let Some(error) = &outcome.error {
                lines.push(row("error", error.to_string().red()));
            }
        },
    }
    lines.push(row("build result", colored_result(outcome.result)));

    if let Some(report) = &outcome.report {
        if let Some(url) = report.dashboard_url() {
            lines.push(row("dashboard", url));
        }
        if let Some(url) = report.compare_release_url(previous) {
            lines.push(row("compare release", url));
        }
    }

    lines.join("\n")
}
