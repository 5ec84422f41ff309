//! Report assembly for one build.

use futures::future::join_all;
use tracing::debug;

use crate::paths::MetricPath;
use crate::report::{ApplicationLink, Report, MILLIS_PER_MINUTE};
use crate::source::MetricSource;

/// Lower bound for the fetch window, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 10;
/// Upper bound for the configured minimum fetch window, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 1440;

/// Minutes of data to fetch for a build that started at `build_start_ms`.
///
/// The elapsed time is rounded up to whole minutes and never drops below
/// `minimum_minutes`.
///
/// ```
/// use appd_regress::duration_to_fetch;
///
/// assert_eq!(duration_to_fetch(0, 3 * 60_000, 10), 10);
/// assert_eq!(duration_to_fetch(0, 25 * 60_000 + 1, 10), 26);
/// ```
pub fn duration_to_fetch(build_start_ms: i64, now_ms: i64, minimum_minutes: u32) -> u32 {
    let elapsed = now_ms.saturating_sub(build_start_ms);
    if elapsed <= 0 {
        return minimum_minutes;
    }
    let minutes = elapsed.saturating_add(MILLIS_PER_MINUTE - 1) / MILLIS_PER_MINUTE;
    u32::try_from(minutes)
        .unwrap_or(u32::MAX)
        .max(minimum_minutes)
}

/// Assembles a [`Report`] by fetching every configured metric path.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    minimum_duration_minutes: u32,
    paths: Vec<MetricPath>,
}

impl ReportBuilder {
    /// Creates a builder fetching `paths` in the given order.
    pub fn new(minimum_duration_minutes: u32, paths: Vec<MetricPath>) -> Self {
        Self {
            minimum_duration_minutes,
            paths,
        }
    }

    /// The configured paths in fetch order.
    pub fn paths(&self) -> &[MetricPath] {
        &self.paths
    }

    /// The configured minimum window in minutes.
    pub fn minimum_duration_minutes(&self) -> u32 {
        self.minimum_duration_minutes
    }

    /// Builds the report for a build that started at `build_start_ms`,
    /// using the current wall-clock time as the window end.
    pub async fn build<S>(&self, source: &S, build_start_ms: i64) -> Report
    where
        S: MetricSource + ?Sized,
    {
        let now_ms = chrono::Utc::now().timestamp_millis();
        self.build_at(source, build_start_ms, now_ms).await
    }

    /// Builds the report with an explicit window end.
    ///
    /// All paths are fetched concurrently. Paths the source cannot deliver
    /// are left out of the report; the metric order follows the configured
    /// order regardless of completion order.
    pub async fn build_at<S>(&self, source: &S, build_start_ms: i64, now_ms: i64) -> Report
    where
        S: MetricSource + ?Sized,
    {
        let duration = duration_to_fetch(build_start_ms, now_ms, self.minimum_duration_minutes);
        debug!(
            build_start_ms,
            duration_minutes = duration,
            paths = self.paths.len(),
            "fetching metrics for build"
        );

        let fetches = self
            .paths
            .iter()
            .map(|path| source.fetch(path.as_str(), duration, Some(build_start_ms)));
        let series = join_all(fetches).await;

        let fetched = self.paths.iter().zip(series).filter_map(|(path, series)| {
            if series.is_none() {
                debug!(metric_path = %path, custom = path.is_custom(), "metric not available");
            }
            series
        });
        let report = Report::new(build_start_ms, duration, fetched);

        match source.fetch_application_info().await {
            Some(app) => report.with_application(ApplicationLink {
                application_id: app.id,
                controller_base_uri: source.controller_uri().to_string(),
            }),
            None => {
                debug!("application lookup failed, report has no controller links");
                report
            },
        }
    }
}
