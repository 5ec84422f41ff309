//! Regression scoring against the historical baseline.
//!
//! The evaluator is a pure function of its inputs: it reads the current
//! report and the history and returns an [`Evaluation`]. It neither logs nor
//! touches the host's build result; see [`BuildGate`](crate::BuildGate) and
//! [`BuildResult::apply`](crate::BuildResult::apply) for that.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::history::{baseline_average, baseline_reports};
use crate::report::{Report, NO_DATA};

/// Score assigned when the ratio is undefined but both sides are equal.
const NEUTRAL_SCORE: f64 = 100.0;

/// Verdict for one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Ok,
    Unstable,
    Failed,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "OK",
            Self::Unstable => "UNSTABLE",
            Self::Failed => "FAILED",
        })
    }
}

/// Percentage thresholds below which a build is unstable or failed.
///
/// Both values are clamped to `[0, 100]` and are independent of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    unstable_pct: u8,
    failed_pct: u8,
}

impl Thresholds {
    /// Creates thresholds, clamping each value into `[0, 100]`.
    ///
    /// ```
    /// use appd_regress::Thresholds;
    ///
    /// let t = Thresholds::new(120, -5);
    /// assert_eq!((t.unstable_pct(), t.failed_pct()), (100, 0));
    /// ```
    pub fn new(unstable_pct: i64, failed_pct: i64) -> Self {
        Self {
            unstable_pct: clamp_percentage(unstable_pct),
            failed_pct: clamp_percentage(failed_pct),
        }
    }

    pub fn unstable_pct(&self) -> u8 {
        self.unstable_pct
    }

    pub fn failed_pct(&self) -> u8 {
        self.failed_pct
    }

    /// Classifies a score; a score equal to a threshold passes it.
    pub fn classify(&self, score: f64) -> Classification {
        if score - f64::from(self.failed_pct) < 0.0 {
            Classification::Failed
        } else if score - f64::from(self.unstable_pct) < 0.0 {
            Classification::Unstable
        } else {
            Classification::Ok
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(80, 65)
    }
}

fn clamp_percentage(value: i64) -> u8 {
    // Clamped into 0..=100 first, so the cast is lossless.
    value.clamp(0, 100) as u8
}

/// What to compare and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSettings {
    /// Metric path the verdict is based on.
    pub threshold_metric: String,
    /// `true` when smaller values are better, e.g. response times.
    pub lower_is_better: bool,
    pub thresholds: Thresholds,
}

impl EvaluationSettings {
    pub fn new(threshold_metric: impl Into<String>, lower_is_better: bool, thresholds: Thresholds) -> Self {
        Self {
            threshold_metric: threshold_metric.into(),
            lower_is_better,
            thresholds,
        }
    }
}

/// Outcome of comparing a build against its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Current performance as a percentage of the baseline; 100 is on par.
    pub score: f64,
    pub classification: Classification,
    /// Baseline average, `None` without usable history.
    pub baseline: Option<f64>,
    /// Average of the threshold metric in the current report.
    pub current_average: f64,
    /// Number of history reports that passed the baseline filter.
    pub baseline_reports: usize,
}

impl Evaluation {
    /// The baseline, or [`NO_DATA`] when there was none.
    pub fn baseline_or_sentinel(&self) -> f64 {
        self.baseline.unwrap_or(NO_DATA)
    }
}

/// Scores a report against the average of earlier reports.
///
/// # Examples
///
/// ```
/// use appd_regress::{
///     Classification, EvaluationSettings, MetricSeries, MetricValue, RegressionEvaluator, Report,
///     Thresholds,
/// };
///
/// let report = |ts, v| Report::new(ts, 10, vec![MetricSeries::new("A", vec![MetricValue::flat(v)])]);
/// let evaluator = RegressionEvaluator::new(EvaluationSettings::new("A", true, Thresholds::new(80, 65)));
///
/// // Response time doubled: the build scores 50 and fails.
/// let history = [report(1, 100), report(2, 200)];
/// let evaluation = evaluator.evaluate(&report(2, 200), &history).unwrap();
/// assert_eq!(evaluation.score, 50.0);
/// assert_eq!(evaluation.classification, Classification::Failed);
/// ```
#[derive(Debug, Clone)]
pub struct RegressionEvaluator {
    settings: EvaluationSettings,
}

impl RegressionEvaluator {
    pub fn new(settings: EvaluationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EvaluationSettings {
        &self.settings
    }

    /// Evaluates `current` against `history`.
    ///
    /// Fails with [`Error::ThresholdMetricUnavailable`] when the current
    /// report has no samples for the threshold metric or its average is
    /// negative. Without a usable
    /// baseline the build scores 100 and passes.
    pub fn evaluate<'a, I>(&self, current: &Report, history: I) -> Result<Evaluation>
    where
        I: IntoIterator<Item = &'a Report>,
    {
        let metric = self.settings.threshold_metric.as_str();
        let current_average = current
            .mean(metric)
            .ok()
            .flatten()
            .filter(|average| *average >= 0.0)
            .ok_or_else(|| Error::ThresholdMetricUnavailable {
                metric: metric.to_string(),
            })?;

        let kept = baseline_reports(current, history);
        let baseline = baseline_average(&kept, metric);
        let score = match baseline {
            Some(baseline) if self.settings.lower_is_better => percentage(baseline, current_average),
            Some(baseline) => percentage(current_average, baseline),
            None => NEUTRAL_SCORE,
        };

        Ok(Evaluation {
            score,
            classification: self.settings.thresholds.classify(score),
            baseline,
            current_average,
            baseline_reports: kept.len(),
        })
    }
}

/// `numerator / denominator * 100`, defined for a zero denominator.
fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        if numerator == 0.0 {
            NEUTRAL_SCORE
        } else {
            f64::INFINITY
        }
    } else {
        numerator / denominator * 100.0
    }
}
