//! TOML configuration for the build gate.
//!
//! # Example TOML
//!
//! ```toml
//! [controller]
//! uri = "http://controller.example.com:8090"
//! username = "ci-user"
//! application = "Web Shop"
//!
//! [gate]
//! unstable_threshold = 80
//! failed_threshold = 65
//! minimum_duration_minutes = 10
//! lower_is_better = true
//! threshold_metric = "Overall Application Performance|Average Response Time (ms)"
//! custom_metric_path = "Overall Application Performance|Stall Count"
//! ```
//!
//! Out-of-range numbers are clamped rather than rejected: thresholds into
//! `[0, 100]` and the minimum duration into `[10, 1440]` minutes. The password
//! is usually left out of the file and supplied at runtime.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::builder::{ReportBuilder, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};
use crate::error::{Error, Result};
use crate::evaluator::{EvaluationSettings, Thresholds};
use crate::paths::{
    merged_metric_paths, resolve_threshold_metric, MetricPath, DEFAULT_CUSTOM_METRIC_PATH,
    DEFAULT_THRESHOLD_METRIC,
};

/// Username used when none is configured.
pub const DEFAULT_USERNAME: &str = "username@customer1";

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Controller connection.
    pub controller: ControllerSettings,
    /// Regression thresholds and collected metrics.
    #[serde(default)]
    pub gate: GateSettings,
}

/// Connection settings for the AppDynamics controller.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSettings {
    /// Controller base URI, e.g. `http://controller:8090`.
    pub uri: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// Application name as shown in the controller.
    pub application: String,
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

impl std::fmt::Debug for ControllerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerSettings")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("application", &self.application)
            .finish()
    }
}

/// Settings of the regression gate itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    /// Score below which the build becomes unstable.
    pub unstable_threshold: i64,
    /// Score below which the build fails.
    pub failed_threshold: i64,
    /// Shortest window fetched, in minutes.
    pub minimum_duration_minutes: i64,
    pub lower_is_better: bool,
    /// Metric path the verdict is based on, or the custom-path label.
    pub threshold_metric: String,
    /// Metric path fetched in addition to the fixed list.
    pub custom_metric_path: String,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            unstable_threshold: 80,
            failed_threshold: 65,
            minimum_duration_minutes: i64::from(MIN_DURATION_MINUTES),
            lower_is_better: true,
            threshold_metric: DEFAULT_THRESHOLD_METRIC.to_string(),
            custom_metric_path: DEFAULT_CUSTOM_METRIC_PATH.to_string(),
        }
    }
}

impl GateSettings {
    /// Clamps all numeric settings into their valid ranges.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.unstable_threshold = self.unstable_threshold.clamp(0, 100);
        self.failed_threshold = self.failed_threshold.clamp(0, 100);
        self.minimum_duration_minutes = self
            .minimum_duration_minutes
            .clamp(i64::from(MIN_DURATION_MINUTES), i64::from(MAX_DURATION_MINUTES));
        if self.custom_metric_path.trim().is_empty() {
            self.custom_metric_path = DEFAULT_CUSTOM_METRIC_PATH.to_string();
        }
        self
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.unstable_threshold, self.failed_threshold)
    }

    /// Minimum window in minutes, within `[10, 1440]`.
    pub fn minimum_duration(&self) -> u32 {
        let clamped = self
            .minimum_duration_minutes
            .clamp(i64::from(MIN_DURATION_MINUTES), i64::from(MAX_DURATION_MINUTES));
        u32::try_from(clamped).unwrap_or(MIN_DURATION_MINUTES)
    }

    /// The fixed metric paths followed by the custom path.
    pub fn metric_paths(&self) -> Vec<MetricPath> {
        merged_metric_paths(&self.custom_metric_path)
    }

    /// The threshold metric with defaults and the custom label resolved.
    pub fn resolved_threshold_metric(&self) -> String {
        resolve_threshold_metric(&self.threshold_metric, &self.custom_metric_path)
    }

    pub fn evaluation_settings(&self) -> EvaluationSettings {
        EvaluationSettings::new(
            self.resolved_threshold_metric(),
            self.lower_is_better,
            self.thresholds(),
        )
    }

    pub fn report_builder(&self) -> ReportBuilder {
        ReportBuilder::new(self.minimum_duration(), self.metric_paths())
    }
}

impl GateConfig {
    /// Parses, clamps and validates a TOML document.
    ///
    /// The password is not required here; check it with
    /// [`ControllerSettings::validate_credentials`] once runtime overrides
    /// have been applied.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.gate = config.gate.clamped();
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    ///
    /// Returns [`Error::ConfigIo`] if the file cannot be read,
    /// [`Error::ConfigParse`] if the TOML is malformed, or
    /// [`Error::Config`] if validation fails.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            source,
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Checks the controller URI, username and application name.
    pub fn validate(&self) -> Result<()> {
        let controller = &self.controller;
        if !validate_rest_uri(&controller.uri) {
            return Err(config_error(format!(
                "controller.uri must start with http:// or https://, got '{}'",
                controller.uri
            )));
        }
        if !validate_username(&controller.username) {
            return Err(config_error("controller.username must not be blank"));
        }
        if !validate_application_name(&controller.application) {
            return Err(config_error("controller.application must not be blank"));
        }
        Ok(())
    }
}

impl ControllerSettings {
    /// Fails if no password has been provided.
    pub fn validate_credentials(&self) -> Result<()> {
        if validate_password(&self.password) {
            Ok(())
        } else {
            Err(config_error(
                "controller password is missing; set controller.password or APPD_PASSWORD",
            ))
        }
    }
}

fn config_error(message: impl Into<String>) -> Error {
    Error::Config {
        message: message.into(),
    }
}

/// Returns `true` for a well-formed `http://` or `https://` URI.
pub fn validate_rest_uri(uri: &str) -> bool {
    if is_blank(uri) || !(uri.starts_with("http://") || uri.starts_with("https://")) {
        return false;
    }
    Url::parse(uri).is_ok()
}

/// Returns `true` for a non-blank username.
pub fn validate_username(username: &str) -> bool {
    !is_blank(username)
}

/// Returns `true` for a non-blank password.
pub fn validate_password(password: &str) -> bool {
    !is_blank(password)
}

/// Returns `true` for a non-blank application name.
pub fn validate_application_name(name: &str) -> bool {
    !is_blank(name)
}

fn is_blank(field: &str) -> bool {
    field.trim().is_empty()
}
