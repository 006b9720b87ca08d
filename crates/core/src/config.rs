//! Configuration structures for WTP estimation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Main configuration for an estimation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// NPMLE solver configuration.
    pub npmle: NpmleConfig,
    /// Survivor curve reconciliation configuration.
    pub survival: SurvivalConfig,
    /// WTP summary configuration.
    pub summary: SummaryConfig,
    /// Text report configuration.
    pub report: ReportConfig,
}

impl Config {
    /// Parse a (possibly partial) JSON document over the defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<()> {
        if self.npmle.max_iterations == 0 {
            return Err(Error::config("npmle.max_iterations must be at least 1"));
        }
        if !(self.npmle.tolerance > 0.0 && self.npmle.tolerance.is_finite()) {
            return Err(Error::config(format!(
                "npmle.tolerance must be positive, got {}",
                self.npmle.tolerance
            )));
        }
        if !(1..=15).contains(&self.survival.rounding_digits) {
            return Err(Error::config(format!(
                "survival.rounding_digits must be within 1..=15, got {}",
                self.survival.rounding_digits
            )));
        }
        if !(self.summary.median_level > 0.0 && self.summary.median_level < 1.0) {
            return Err(Error::config(format!(
                "summary.median_level must be in (0, 1), got {}",
                self.summary.median_level
            )));
        }
        if !(self.summary.median_extrapolation >= 1.0 && self.summary.median_extrapolation.is_finite()) {
            return Err(Error::config(format!(
                "summary.median_extrapolation must be >= 1, got {}",
                self.summary.median_extrapolation
            )));
        }
        Ok(())
    }
}

/// Interval-censored NPMLE configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NpmleConfig {
    /// Hard cap on EM iterations.
    pub max_iterations: u32,
    /// Stop once the log-likelihood improves by less than this.
    pub tolerance: f64,
}

impl Default for NpmleConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-9,
        }
    }
}

/// Survivor curve configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivalConfig {
    /// Decimal digits kept on cumulative masses before `1 - cumsum`.
    pub rounding_digits: i32,
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self { rounding_digits: 12 }
    }
}

/// WTP summary configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Survival level bracketed by the median bounds.
    pub median_level: f64,
    /// Multiplier on the largest bid used when survival never drops below
    /// the median level.
    pub median_extrapolation: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            median_level: 0.5,
            median_extrapolation: 1.1,
        }
    }
}

/// Text report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Digits after the decimal point.
    pub precision: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { precision: 4 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.npmle.max_iterations, 10_000);
        assert_eq!(config.survival.rounding_digits, 12);
        assert_eq!(config.summary.median_level, 0.5);
        assert_eq!(config.summary.median_extrapolation, 1.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_over_defaults() {
        let config = Config::from_json_str(r#"{"npmle": {"max_iterations": 50}}"#).unwrap();
        assert_eq!(config.npmle.max_iterations, 50);
        assert_eq!(config.npmle.tolerance, 1e-9);
        assert_eq!(config.report.precision, 4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Config::from_json_str(r#"{"summary": {"median_level": 1.5}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let mut config = Config::default();
        config.npmle.tolerance = 0.0;
        assert!(config.validate().is_err());
    }
}
