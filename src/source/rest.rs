//! AppDynamics controller REST client.
//!
//! All requests go to the application resource
//! `{controller}/controller/rest/applications/{application}/` with HTTP basic
//! authentication and `output=JSON`. Failures of any kind are logged and
//! surface as `None` through [`MetricSource`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::MetricSource;
use crate::config::ControllerSettings;
use crate::metric::{ApplicationInfo, MetricSeries};

const DEFAULT_TENANT: &str = "customer1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CONTROLLER_SEGMENTS: &[&str] = &["controller"];
const REST_SEGMENTS: &[&str] = &["controller", "rest", "applications"];

/// Failure of a single controller request.
///
/// Never returned from the public API: the REST source converts every
/// `SourceError` into an absent result after logging it.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The controller answered with a non-200 status.
    #[error("controller returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The response body was not the expected JSON.
    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The controller returned an empty metric list.
    #[error("no metric data returned for {path}")]
    EmptyPayload { path: String },

    /// The application list did not contain the configured application.
    #[error("application '{name}' not found on controller")]
    ApplicationNotFound { name: String },
}

/// [`MetricSource`] backed by the controller REST API.
///
/// # Examples
///
/// ```no_run
/// use appd_regress::{MetricSource, RestMetricSource};
///
/// # async fn example() -> Result<(), appd_regress::source::SourceError> {
/// let source = RestMetricSource::new("http://controller:8090", "admin", "secret", "Shop")?;
/// if source.validate_connection().await {
///     let series = source
///         .fetch("Overall Application Performance|Calls per Minute", 10, None)
///         .await;
///     println!("{series:?}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct RestMetricSource {
    client: Client,
    application_uri: String,
    controller_uri: String,
    application_name: String,
    username: String,
    password: String,
}

impl RestMetricSource {
    /// Creates a client for `application_name` on the controller at `controller_uri`.
    ///
    /// The URI may be given with or without the `controller/rest/applications`
    /// suffix. A username without tenant is qualified with `@customer1`.
    pub fn new(
        controller_uri: &str,
        username: &str,
        password: &str,
        application_name: &str,
    ) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(
            client,
            controller_uri,
            username,
            password,
            application_name,
        ))
    }

    /// Creates a client from the `[controller]` configuration table.
    pub fn from_settings(settings: &ControllerSettings) -> Result<Self, SourceError> {
        Self::new(
            &settings.uri,
            &settings.username,
            &settings.password,
            &settings.application,
        )
    }

    /// Like [`new`](Self::new) with a preconfigured HTTP client.
    pub fn with_client(
        client: Client,
        controller_uri: &str,
        username: &str,
        password: &str,
        application_name: &str,
    ) -> Self {
        let rest_uri = normalize_uri(controller_uri, REST_SEGMENTS);
        let application_uri = format!(
            "{rest_uri}{}",
            with_trailing_slash(&encode_segment(application_name))
        );
        let username = qualify_username(username);
        debug!(%application_uri, %username, "configured AppDynamics REST source");

        Self {
            client,
            application_uri,
            controller_uri: normalize_uri(controller_uri, CONTROLLER_SEGMENTS),
            application_name: application_name.to_string(),
            username,
            password: password.to_string(),
        }
    }

    /// The application resource all requests are relative to.
    pub fn application_uri(&self) -> &str {
        &self.application_uri
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, SourceError> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(SourceError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let response = self.get(url).await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), output = %body, "response from AppDynamics controller");
        Ok(serde_json::from_str(&body)?)
    }

    fn metric_data_url(&self, path: &str, duration_minutes: u32, start_time_ms: Option<i64>) -> String {
        let time_range = match start_time_ms.filter(|start| *start > 0) {
            Some(start) => format!("time-range-type=AFTER_TIME&start-time={start}"),
            None => "time-range-type=BEFORE_NOW".to_string(),
        };
        format!(
            "{}metric-data?metric-path={}&{time_range}&duration-in-mins={duration_minutes}&rollup=false&output=JSON",
            self.application_uri,
            encode_segment(path),
        )
    }

    async fn try_fetch(
        &self,
        path: &str,
        duration_minutes: u32,
        start_time_ms: Option<i64>,
    ) -> Result<MetricSeries, SourceError> {
        let url = self.metric_data_url(path, duration_minutes, start_time_ms);
        let series: Vec<MetricSeries> = self.get_json(&url).await?;
        series
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::EmptyPayload {
                path: path.to_string(),
            })
    }

    async fn try_fetch_application(&self) -> Result<ApplicationInfo, SourceError> {
        let url = format!("{}?output=JSON", self.application_uri);
        let applications: Vec<ApplicationInfo> = self.get_json(&url).await?;
        applications
            .into_iter()
            .find(|app| app.name == self.application_name)
            .ok_or_else(|| SourceError::ApplicationNotFound {
                name: self.application_name.clone(),
            })
    }
}

impl fmt::Debug for RestMetricSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestMetricSource")
            .field("application_uri", &self.application_uri)
            .field("controller_uri", &self.controller_uri)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MetricSource for RestMetricSource {
    async fn fetch(
        &self,
        path: &str,
        duration_minutes: u32,
        start_time_ms: Option<i64>,
    ) -> Option<MetricSeries> {
        match self.try_fetch(path, duration_minutes, start_time_ms).await {
            Ok(series) => {
                debug!(metric_path = %series.metric_path, "fetched metric data");
                Some(series)
            },
            Err(e) => {
                info!(metric_path = %path, error = %e, "could not fetch metric data from AppDynamics");
                None
            },
        }
    }

    async fn fetch_application_info(&self) -> Option<ApplicationInfo> {
        debug!(application = %self.application_name, "looking up application");
        match self.try_fetch_application().await {
            Ok(app) => {
                debug!(id = app.id, name = %app.name, "fetched application");
                Some(app)
            },
            Err(e @ SourceError::Status { .. }) => {
                warn!(error = %e, "application lookup not successful");
                None
            },
            Err(e) => {
                info!(error = %e, "could not fetch applications from AppDynamics");
                None
            },
        }
    }

    async fn validate_connection(&self) -> bool {
        let url = format!("{}business-transactions/?output=JSON", self.application_uri);
        match self.get(&url).await {
            Ok(response) => {
                debug!(status = response.status().as_u16(), "AppDynamics connection validated");
                true
            },
            Err(e) => {
                info!(error = %e, "could not connect to the AppDynamics REST interface");
                false
            },
        }
    }

    fn controller_uri(&self) -> &str {
        &self.controller_uri
    }
}

fn with_trailing_slash(segment: &str) -> String {
    if segment.ends_with('/') {
        segment.to_string()
    } else {
        format!("{segment}/")
    }
}

/// Appends every segment the raw URI does not already mention.
fn normalize_uri(raw: &str, segments: &[&str]) -> String {
    let mut uri = with_trailing_slash(raw);
    for segment in segments {
        if !raw.contains(segment) {
            uri.push_str(segment);
            uri.push('/');
        }
    }
    uri
}

fn qualify_username(username: &str) -> String {
    if username.contains('@') {
        username.to_string()
    } else {
        format!("{username}@{DEFAULT_TENANT}")
    }
}

/// Percent-encodes a path segment or query value; spaces become `%20`.
fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
