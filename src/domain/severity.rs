//! Severity classification strategies
//!
//! Two threshold shapes are used by the detectors:
//! - ratio thresholds ("higher is worse"): share of affected assets
//! - signal thresholds ("lower is worse"): precomputed health ratio in [0,1]
//!
//! Both compare strictly, so a value sitting exactly on a threshold falls into
//! the milder bucket.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::catalog::FilterParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Critical,
    Warning,
    Info,
}

impl IssueSeverity {
    pub const ALL: [IssueSeverity; 3] = [IssueSeverity::Critical, IssueSeverity::Warning, IssueSeverity::Info];

    pub fn as_str(self) -> &'static str {
        match self {
            IssueSeverity::Critical => "critical",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Info => "info",
        }
    }
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueSeverity {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "critical" => Ok(IssueSeverity::Critical),
            "warning" => Ok(IssueSeverity::Warning),
            "info" => Ok(IssueSeverity::Info),
            other => Err(FilterParseError::unknown("severity", other)),
        }
    }
}

/// Thresholds for "higher is worse" ratios
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioThresholds {
    pub critical: f64,
    pub warning: f64,
    pub info: f64,
}

impl RatioThresholds {
    pub const fn new(critical: f64, warning: f64, info: f64) -> Self {
        Self { critical, warning, info }
    }

    pub fn classify(&self, ratio: f64) -> Option<IssueSeverity> {
        if ratio.is_nan() {
            return None;
        }
        if ratio > self.critical {
            Some(IssueSeverity::Critical)
        } else if ratio > self.warning {
            Some(IssueSeverity::Warning)
        } else if ratio > self.info {
            Some(IssueSeverity::Info)
        } else {
            None
        }
    }
}

/// Thresholds for "lower is worse" signals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    pub critical: f64,
    pub warning: f64,
    pub info: f64,
}

impl SignalThresholds {
    pub const fn new(critical: f64, warning: f64, info: f64) -> Self {
        Self { critical, warning, info }
    }

    /// `None` input means the signal was not collected and never raises an issue.
    pub fn classify(&self, value: Option<f64>) -> Option<IssueSeverity> {
        let value = value.filter(|v| v.is_finite())?;
        if value < self.critical {
            Some(IssueSeverity::Critical)
        } else if value < self.warning {
            Some(IssueSeverity::Warning)
        } else if value < self.info {
            Some(IssueSeverity::Info)
        } else {
            None
        }
    }
}

/// Affected/total with a zero-denominator guard
pub fn affected_ratio(affected: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(affected as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const RATIO: RatioThresholds = RatioThresholds::new(0.3, 0.1, 0.0);
    const SIGNAL: SignalThresholds = SignalThresholds::new(0.3, 0.5, 0.7);

    #[rstest]
    #[case(1.0, Some(IssueSeverity::Critical))]
    #[case(0.31, Some(IssueSeverity::Critical))]
    #[case(0.3, Some(IssueSeverity::Warning))]
    #[case(0.2, Some(IssueSeverity::Warning))]
    #[case(0.1, Some(IssueSeverity::Info))]
    #[case(0.05, Some(IssueSeverity::Info))]
    #[case(0.0, None)]
    fn ratio_thresholds_are_strict(#[case] ratio: f64, #[case] expected: Option<IssueSeverity>) {
        assert_eq!(RATIO.classify(ratio), expected);
    }

    #[rstest]
    #[case(Some(0.1), Some(IssueSeverity::Critical))]
    #[case(Some(0.3), Some(IssueSeverity::Warning))]
    #[case(Some(0.5), Some(IssueSeverity::Info))]
    #[case(Some(0.7), None)]
    #[case(Some(0.95), None)]
    #[case(None, None)]
    fn signal_thresholds_are_strict(#[case] value: Option<f64>, #[case] expected: Option<IssueSeverity>) {
        assert_eq!(SIGNAL.classify(value), expected);
    }

    #[test]
    fn zero_denominator_has_no_ratio() {
        assert_eq!(affected_ratio(0, 0), None);
        assert_eq!(affected_ratio(3, 0), None);
        assert_eq!(affected_ratio(1, 4), Some(0.25));
    }

    #[test]
    fn nan_inputs_never_classify() {
        assert_eq!(RATIO.classify(f64::NAN), None);
        assert_eq!(SIGNAL.classify(Some(f64::NAN)), None);
    }
}
