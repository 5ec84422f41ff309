//! Merging an evaluation into the host's build result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::evaluator::Classification;

/// Result of a build as tracked by the host, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

impl BuildResult {
    /// Merges a classification into this result.
    ///
    /// A failed classification yields the worse of `self` and
    /// [`Failure`](Self::Failure). An unstable one downgrades only a
    /// result that is strictly better than [`Unstable`](Self::Unstable).
    /// An OK classification never changes the result.
    ///
    /// ```
    /// use appd_regress::{BuildResult, Classification};
    ///
    /// assert_eq!(BuildResult::Success.apply(Classification::Unstable), BuildResult::Unstable);
    /// assert_eq!(BuildResult::Failure.apply(Classification::Unstable), BuildResult::Failure);
    /// assert_eq!(BuildResult::Aborted.apply(Classification::Failed), BuildResult::Aborted);
    /// assert_eq!(BuildResult::Unstable.apply(Classification::Ok), BuildResult::Unstable);
    /// ```
    #[must_use]
    pub fn apply(self, classification: Classification) -> Self {
        match classification {
            Classification::Failed => self.max(Self::Failure),
            Classification::Unstable if self < Self::Unstable => Self::Unstable,
            Classification::Unstable | Classification::Ok => self,
        }
    }

    /// Result after the evaluation could not be carried out.
    ///
    /// Anything at least as good as [`Unstable`](Self::Unstable) becomes
    /// [`Failure`](Self::Failure).
    #[must_use]
    pub fn degrade_for_error(self) -> Self {
        if self <= Self::Unstable {
            Self::Failure
        } else {
            self
        }
    }

    /// Returns `true` for results that do not block a pipeline.
    pub fn is_passing(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "SUCCESS",
            Self::Unstable => "UNSTABLE",
            Self::Failure => "FAILURE",
            Self::NotBuilt => "NOT_BUILT",
            Self::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for BuildResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SUCCESS" => Ok(Self::Success),
            "UNSTABLE" => Ok(Self::Unstable),
            "FAILURE" => Ok(Self::Failure),
            "NOT_BUILT" => Ok(Self::NotBuilt),
            "ABORTED" => Ok(Self::Aborted),
            other => Err(format!("unknown build result: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ALL: [BuildResult; 5] = [
        BuildResult::Success,
        BuildResult::Unstable,
        BuildResult::Failure,
        BuildResult::NotBuilt,
        BuildResult::Aborted,
    ];

    #[test]
    fn test_ok_never_changes_result() {
        for result in ALL {
            assert_eq!(result.apply(Classification::Ok), result);
        }
    }

    #[test]
    fn test_failed_never_improves_result() {
        for result in ALL {
            let merged = result.apply(Classification::Failed);
            assert!(merged >= result);
            assert!(merged >= BuildResult::Failure);
        }
    }

    #[test]
    fn test_unstable_only_when_strictly_worse() {
        assert_eq!(BuildResult::Success.apply(Classification::Unstable), BuildResult::Unstable);
        assert_eq!(BuildResult::Unstable.apply(Classification::Unstable), BuildResult::Unstable);
        assert_eq!(BuildResult::Failure.apply(Classification::Unstable), BuildResult::Failure);
        assert_eq!(BuildResult::NotBuilt.apply(Classification::Unstable), BuildResult::NotBuilt);
    }

    #[test]
    fn test_errors_degrade_to_failure() {
        assert_eq!(BuildResult::Success.degrade_for_error(), BuildResult::Failure);
        assert_eq!(BuildResult::Unstable.degrade_for_error(), BuildResult::Failure);
        assert_eq!(BuildResult::Failure.degrade_for_error(), BuildResult::Failure);
        assert_eq!(BuildResult::Aborted.degrade_for_error(), BuildResult::Aborted);
    }

    #[test]
    fn test_parses_and_displays() {
        for result in ALL {
            assert_eq!(result.to_string().parse::<BuildResult>().unwrap(), result);
        }
        assert_eq!("not-built".parse::<BuildResult>().unwrap(), BuildResult::NotBuilt);
        assert!("green".parse::<BuildResult>().is_err());
    }
}
