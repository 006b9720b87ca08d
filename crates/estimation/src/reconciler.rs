//! Survivor step function over the full bid grid.
//!
//! The NPMLE only reports the right endpoints of mass-bearing intervals.
//! Bids it skips get the survival value of the preceding grid point, and a
//! point at bid 0 with survival 1 heads the curve.

use tracing::debug;
use wtp_core::config::SurvivalConfig;
use wtp_core::{DistinctBidSet, Error, NpmleFit, Result, SurvivalCurve, SurvivalPoint};

/// Round to `digits` decimal places.
#[inline]
fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Aligns an NPMLE fit with the distinct bid set.
#[derive(Debug, Clone)]
pub struct SurvivorReconciler {
    rounding_digits: i32,
}

impl Default for SurvivorReconciler {
    fn default() -> Self {
        Self::new(&SurvivalConfig::default())
    }
}

impl SurvivorReconciler {
    /// Create a new reconciler.
    pub fn new(config: &SurvivalConfig) -> Self {
        Self {
            rounding_digits: config.rounding_digits,
        }
    }

    /// Survival just after each Turnbull interval's right endpoint.
    fn steps(&self, fit: &NpmleFit) -> Result<Vec<(f64, f64)>> {
        let mut cumulative = 0.0;
        let mut steps = Vec::with_capacity(fit.intervals.len());

        for interval in &fit.intervals {
            if !interval.mass.is_finite() || interval.mass < 0.0 {
                return Err(Error::estimation(format!(
                    "invalid mass {} on ({}, {}]",
                    interval.mass, interval.left, interval.right
                )));
            }
            cumulative += interval.mass;
            let survival = (1.0 - round_to(cumulative, self.rounding_digits)).clamp(0.0, 1.0);
            steps.push((interval.right, survival));
        }
        Ok(steps)
    }

    /// Build the survivor curve over every finite bid in `bids`.
    pub fn reconcile(&self, bids: &DistinctBidSet, fit: &NpmleFit) -> Result<SurvivalCurve> {
        let steps = self.steps(fit)?;
        let grid = bids.finite();

        let mut points = Vec::with_capacity(grid.len() + 1);
        if grid.first() != Some(&0.0) {
            points.push(SurvivalPoint {
                bid: 0.0,
                survival: 1.0,
            });
        }

        let mut next = 0;
        let mut current = 1.0;
        let mut filled = 0usize;
        for &bid in grid {
            // Endpoints off the grid still move the curve.
            while next < steps.len() && steps[next].0 < bid {
                current = steps[next].1;
                next += 1;
            }
            if next < steps.len() && steps[next].0 == bid {
                current = steps[next].1;
                next += 1;
            } else {
                filled += 1;
            }
            points.push(SurvivalPoint {
                bid,
                survival: current,
            });
        }

        debug!(points = points.len(), filled, "reconciled survivor curve");
        Ok(SurvivalCurve { points })
    }
}
