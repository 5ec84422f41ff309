//! Per-build snapshot of all fetched metric series.
//!
//! A [`Report`] is assembled once by the [`ReportBuilder`](crate::ReportBuilder)
//! and is read-only afterwards. Statistics are derived on demand and never
//! cached, so repeated calls always agree.

use chrono::DateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::links;
use crate::metric::MetricSeries;

/// Marker returned by [`Report::average`] when a series has no samples.
///
/// Callers must check for it before using an average arithmetically. The
/// typed alternative is [`Report::mean`].
pub const NO_DATA: f64 = -1.0;

/// Milliseconds per minute, used to derive window end times.
pub(crate) const MILLIS_PER_MINUTE: i64 = 60_000;

/// Link from a report to the controller application it was fetched from.
///
/// Present only when the application lookup succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationLink {
    /// Controller-assigned application id.
    pub application_id: i64,
    /// Base URI of the controller UI, ending in `controller/`.
    pub controller_base_uri: String,
}

/// Immutable snapshot of the metrics fetched for one build.
///
/// # Examples
///
/// ```
/// use appd_regress::{MetricSeries, MetricValue, Report, NO_DATA};
///
/// let report = Report::new(
///     1_700_000_000_000,
///     10,
///     vec![
///         MetricSeries::new("A", vec![MetricValue::flat(10), MetricValue::flat(20)]),
///         MetricSeries::empty("B"),
///     ],
/// );
/// assert_eq!(report.average("A").unwrap(), 15.0);
/// assert_eq!(report.average("B").unwrap(), NO_DATA);
/// assert!(report.average("C").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    timestamp_ms: i64,
    duration_minutes: u32,
    metrics: IndexMap<String, MetricSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    application: Option<ApplicationLink>,
}

impl Report {
    /// Creates a report from its series, keyed by each series' path.
    ///
    /// Series order is preserved; a repeated path keeps its first position
    /// and the later series.
    pub fn new(
        timestamp_ms: i64,
        duration_minutes: u32,
        series: impl IntoIterator<Item = MetricSeries>,
    ) -> Self {
        let metrics = series
            .into_iter()
            .map(|s| (s.metric_path.clone(), s))
            .collect();
        Self {
            timestamp_ms,
            duration_minutes,
            metrics,
            application: None,
        }
    }

    /// Attaches the controller application link.
    pub fn with_application(mut self, link: ApplicationLink) -> Self {
        self.application = Some(link);
        self
    }

    /// Build start in milliseconds since the epoch.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    /// Length of the fetched window in minutes.
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// End of the fetched window in milliseconds since the epoch.
    pub fn end_timestamp_ms(&self) -> i64 {
        self.timestamp_ms + i64::from(self.duration_minutes) * MILLIS_PER_MINUTE
    }

    /// The controller application link, if the lookup succeeded.
    pub fn application(&self) -> Option<&ApplicationLink> {
        self.application.as_ref()
    }

    /// Series in fetch order.
    pub fn metrics(&self) -> impl Iterator<Item = &MetricSeries> {
        self.metrics.values()
    }

    /// Paths of the fetched series in fetch order.
    pub fn metric_paths(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    /// Number of fetched series.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns `true` when no series was fetched.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Returns `true` if `path` was fetched.
    pub fn contains(&self, path: &str) -> bool {
        self.metrics.contains_key(path)
    }

    /// Looks up a series by path.
    pub fn metric(&self, path: &str) -> Result<&MetricSeries> {
        self.metrics.get(path).ok_or_else(|| Error::UnknownMetric {
            path: path.to_string(),
        })
    }

    /// Arithmetic mean of the `value` samples, or [`NO_DATA`] for an empty series.
    pub fn average(&self, path: &str) -> Result<f64> {
        Ok(self.mean(path)?.unwrap_or(NO_DATA))
    }

    /// Arithmetic mean of the `value` samples, `None` for an empty series.
    pub fn mean(&self, path: &str) -> Result<Option<f64>> {
        Ok(self.metric(path)?.mean())
    }

    /// Largest `max` sample, `None` for an empty series.
    pub fn max(&self, path: &str) -> Result<Option<i64>> {
        Ok(self.metric(path)?.max())
    }

    /// Smallest `min` sample, `None` for an empty series.
    pub fn min(&self, path: &str) -> Result<Option<i64>> {
        Ok(self.metric(path)?.min())
    }

    /// Human-readable title of the report.
    pub fn display_name(&self) -> String {
        let time = DateTime::from_timestamp_millis(self.timestamp_ms)
            .map(|t| t.format("%b %-d, %Y %-I:%M:%S %p").to_string())
            .unwrap_or_else(|| self.timestamp_ms.to_string());
        format!(
            "AppDynamics Metric Report for time {time} - with a duration of {} minutes",
            self.duration_minutes
        )
    }

    /// Controller dashboard link for this report's window.
    pub fn dashboard_url(&self) -> Option<String> {
        let app = self.application.as_ref()?;
        Some(links::dashboard_url(
            &app.controller_base_uri,
            app.application_id,
            self.timestamp_ms,
            self.end_timestamp_ms(),
        ))
    }

    /// Release-comparison link between this report and `previous`.
    ///
    /// Without a previous report both ranges cover this report's window.
    pub fn compare_release_url(&self, previous: Option<&Report>) -> Option<String> {
        let app = self.application.as_ref()?;
        let current = (self.timestamp_ms, self.end_timestamp_ms());
        let previous = previous
            .map(|p| (p.timestamp_ms, p.end_timestamp_ms()))
            .unwrap_or(current);
        Some(links::compare_release_url(
            &app.controller_base_uri,
            app.application_id,
            current,
            previous,
        ))
    }
}
