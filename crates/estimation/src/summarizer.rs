//! WTP statistics from a reconciled survivor curve.
//!
//! Both means integrate the curve from bid 0 up to the largest finite bid;
//! the open tail above it contributes nothing, so they are lower bounds
//! whenever survival at the largest bid is positive.

use wtp_core::config::SummaryConfig;
use wtp_core::{Error, MedianBounds, Result, SurvivalCurve, WtpEstimate};

/// Computes Kaplan-Meier and Spearman-Karber means and median bounds.
#[derive(Debug, Clone)]
pub struct WtpSummarizer {
    config: SummaryConfig,
}

impl Default for WtpSummarizer {
    fn default() -> Self {
        Self::new(SummaryConfig::default())
    }
}

impl WtpSummarizer {
    /// Create a new summarizer.
    pub fn new(config: SummaryConfig) -> Self {
        Self { config }
    }

    /// Area under the step function, each segment at its right-hand height.
    pub fn kaplan_meier_mean(curve: &SurvivalCurve) -> f64 {
        curve
            .points
            .windows(2)
            .map(|w| (w[1].bid - w[0].bid) * w[1].survival)
            .sum()
    }

    /// Trapezoidal area under the survival points.
    pub fn spearman_karber_mean(curve: &SurvivalCurve) -> f64 {
        curve
            .points
            .windows(2)
            .map(|w| (w[1].bid - w[0].bid) * (w[0].survival + w[1].survival) / 2.0)
            .sum()
    }

    /// Bids bracketing the configured survival level.
    pub fn median_bounds(&self, curve: &SurvivalCurve) -> MedianBounds {
        let level = self.config.median_level;

        let lower = curve
            .points
            .iter()
            .filter(|p| p.survival > level)
            .map(|p| p.bid)
            .last()
            .unwrap_or(0.0);

        match curve.points.iter().find(|p| p.survival < level) {
            Some(p) => MedianBounds {
                lower,
                upper: p.bid,
                extrapolated: false,
            },
            None => {
                let max_bid = curve.points.last().map(|p| p.bid).unwrap_or(0.0);
                MedianBounds {
                    lower,
                    upper: max_bid * self.config.median_extrapolation,
                    extrapolated: true,
                }
            }
        }
    }

    /// Summarize a curve that starts at bid 0 with survival 1.
    pub fn summarize(&self, curve: &SurvivalCurve) -> Result<WtpEstimate> {
        let first = curve
            .points
            .first()
            .ok_or_else(|| Error::estimation("survivor curve is empty"))?;
        if first.bid != 0.0 || first.survival != 1.0 {
            return Err(Error::estimation(format!(
                "survivor curve must start at (0, 1), starts at ({}, {})",
                first.bid, first.survival
            )));
        }

        Ok(WtpEstimate {
            mean_km: Self::kaplan_meier_mean(curve),
            mean_sk: Self::spearman_karber_mean(curve),
            median: self.median_bounds(curve),
        })
    }
}
