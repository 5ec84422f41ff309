//! Views over the reports of earlier builds.
//!
//! History is owned by the host. These functions only borrow it and select
//! the reports that take part in a baseline or a trend.

use serde::{Deserialize, Serialize};

use crate::report::Report;

/// A report together with the number of the build it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    pub build_id: u64,
    pub report: Report,
}

impl BuildReport {
    pub fn new(build_id: u64, report: Report) -> Self {
        Self { build_id, report }
    }
}

/// Reports that form the baseline for `current`.
///
/// Reports sharing the current report's timestamp are the current build
/// itself and are excluded, unless the history holds exactly one report,
/// which is always kept.
///
/// ```
/// use appd_regress::{baseline_reports, Report};
///
/// let current = Report::new(200, 10, Vec::new());
/// let history = [Report::new(100, 10, Vec::new()), Report::new(200, 10, Vec::new())];
/// let kept = baseline_reports(&current, &history);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].timestamp_ms(), 100);
/// ```
pub fn baseline_reports<'a, I>(current: &Report, history: I) -> Vec<&'a Report>
where
    I: IntoIterator<Item = &'a Report>,
{
    let history: Vec<&Report> = history.into_iter().collect();
    if history.len() == 1 {
        return history;
    }
    history
        .into_iter()
        .filter(|report| report.timestamp_ms() != current.timestamp_ms())
        .collect()
}

/// Mean of the per-report averages of `metric`.
///
/// Reports without the metric, without samples or with a negative average
/// do not contribute.
/// Returns `None` when nothing contributed.
pub fn baseline_average(reports: &[&Report], metric: &str) -> Option<f64> {
    let averages: Vec<f64> = reports
        .iter()
        .filter_map(|report| report.mean(metric).ok().flatten())
        .filter(|average| *average >= 0.0)
        .collect();
    if averages.is_empty() {
        return None;
    }
    Some(averages.iter().sum::<f64>() / averages.len() as f64)
}

/// One point of a metric's trend across builds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub build_id: u64,
    pub average: f64,
}

/// Per-build averages of `metric`, ordered by build id.
///
/// Builds without the metric or without samples are skipped.
pub fn trend<'a, I>(reports: I, metric: &str) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a BuildReport>,
{
    let mut points: Vec<TrendPoint> = reports
        .into_iter()
        .filter_map(|entry| {
            let average = entry.report.mean(metric).ok().flatten()?;
            Some(TrendPoint {
                build_id: entry.build_id,
                average,
            })
        })
        .collect();
    points.sort_by_key(|point| point.build_id);
    points
}
