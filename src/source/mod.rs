//! Where metric data comes from.
//!
//! [`MetricSource`] is the only seam between report assembly and the
//! monitoring controller. Implementations absorb their own transport
//! failures: a metric that could not be fetched is simply `None`.
//!
//! Two implementations ship with the crate:
//!
//! - [`StaticMetricSource`] serves pre-loaded series from memory
//! - [`rest::RestMetricSource`] talks to the controller REST API (feature `http-client`)

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::metric::{ApplicationInfo, MetricSeries};

#[cfg(feature = "http-client")]
pub mod rest;

#[cfg(feature = "http-client")]
pub use rest::SourceError;

/// Provider of metric series for a time window.
///
/// Implementations must be safe to call concurrently; the report builder
/// issues all fetches of one build at the same time.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Fetches the series for `path` over `duration_minutes`.
    ///
    /// With `start_time_ms` the window begins at that instant, otherwise it
    /// ends now. Returns `None` when the metric is unavailable for any
    /// reason.
    async fn fetch(
        &self,
        path: &str,
        duration_minutes: u32,
        start_time_ms: Option<i64>,
    ) -> Option<MetricSeries>;

    /// Looks up the configured application on the controller.
    async fn fetch_application_info(&self) -> Option<ApplicationInfo>;

    /// Returns `true` if the controller is reachable with the configured
    /// credentials.
    async fn validate_connection(&self) -> bool;

    /// Base URI of the controller UI, used for deep links.
    fn controller_uri(&self) -> &str;
}

/// A fetch recorded by [`StaticMetricSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub path: String,
    pub duration_minutes: u32,
    pub start_time_ms: Option<i64>,
}

/// In-memory [`MetricSource`] serving pre-loaded series.
///
/// Useful for replaying stored data and for tests. Every fetch is recorded
/// and can be inspected with [`requests`](Self::requests).
///
/// # Examples
///
/// ```
/// use appd_regress::{MetricSeries, MetricSource, MetricValue, StaticMetricSource};
///
/// # futures::executor::block_on(async {
/// let source = StaticMetricSource::new("http://ctrl/controller/")
///     .with_series(MetricSeries::new("A", vec![MetricValue::flat(10)]));
///
/// assert!(source.fetch("A", 10, Some(0)).await.is_some());
/// assert!(source.fetch("B", 10, Some(0)).await.is_none());
/// assert_eq!(source.requests().len(), 2);
/// # });
/// ```
#[derive(Debug)]
pub struct StaticMetricSource {
    controller_uri: String,
    series: IndexMap<String, MetricSeries>,
    application: Option<ApplicationInfo>,
    connected: bool,
    requests: Mutex<Vec<FetchRequest>>,
}

impl StaticMetricSource {
    /// Creates an empty, connected source.
    pub fn new(controller_uri: impl Into<String>) -> Self {
        Self {
            controller_uri: controller_uri.into(),
            series: IndexMap::new(),
            application: None,
            connected: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Adds a series, replacing any earlier one with the same path.
    pub fn with_series(mut self, series: MetricSeries) -> Self {
        self.series.insert(series.metric_path.clone(), series);
        self
    }

    /// Sets the application returned by the lookup.
    pub fn with_application(mut self, application: ApplicationInfo) -> Self {
        self.application = Some(application);
        self
    }

    /// Sets the result of the connection check.
    pub fn with_connection(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    /// Fetches issued so far, in call order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl MetricSource for StaticMetricSource {
    async fn fetch(
        &self,
        path: &str,
        duration_minutes: u32,
        start_time_ms: Option<i64>,
    ) -> Option<MetricSeries> {
        self.requests.lock().push(FetchRequest {
            path: path.to_string(),
            duration_minutes,
            start_time_ms,
        });
        self.series.get(path).cloned()
    }

    async fn fetch_application_info(&self) -> Option<ApplicationInfo> {
        self.application.clone()
    }

    async fn validate_connection(&self) -> bool {
        self.connected
    }

    fn controller_uri(&self) -> &str {
        &self.controller_uri
    }
}
