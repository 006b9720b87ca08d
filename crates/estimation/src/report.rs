//! Plain-text summary of an estimation run.

use std::fmt;
use wtp_core::config::ReportConfig;
use wtp_core::{SurvivalCurve, TurnbullEstimate};

/// Survival table: one row per bid.
pub struct SurvivalTable<'a> {
    curve: &'a SurvivalCurve,
    precision: usize,
}

impl<'a> SurvivalTable<'a> {
    pub fn new(curve: &'a SurvivalCurve, precision: usize) -> Self {
        Self { curve, precision }
    }
}

impl fmt::Display for SurvivalTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.precision;
        writeln!(f, "{:>14} {:>14}", "Bid", "Probability")?;
        for point in &self.curve.points {
            writeln!(f, "{:>14.p$} {:>14.p$}", point.bid, point.survival)?;
        }
        Ok(())
    }
}

/// Survival table plus WTP statistics and any warnings.
pub struct SummaryReport<'a> {
    estimate: &'a TurnbullEstimate,
    precision: usize,
}

impl<'a> SummaryReport<'a> {
    /// Report with `precision` digits after the decimal point.
    pub fn new(estimate: &'a TurnbullEstimate, precision: usize) -> Self {
        Self {
            estimate,
            precision,
        }
    }

    pub fn from_config(estimate: &'a TurnbullEstimate, config: &ReportConfig) -> Self {
        Self::new(estimate, config.precision)
    }
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.precision;
        let estimate = self.estimate;
        let wtp = &estimate.wtp;

        writeln!(f, "Survival probability:")?;
        write!(f, "{}", SurvivalTable::new(&estimate.curve, p))?;
        writeln!(f)?;

        write!(f, "WTP estimates (n = {}", estimate.n_obs)?;
        if estimate.dropped_rows > 0 {
            write!(f, ", {} rows dropped", estimate.dropped_rows)?;
        }
        writeln!(f, "):")?;
        writeln!(f, "  Mean (Kaplan-Meier):    {:.p$}", wtp.mean_km)?;
        writeln!(f, "  Mean (Spearman-Karber): {:.p$}", wtp.mean_sk)?;
        write!(
            f,
            "  Median:                 in [{:.p$}, {:.p$}]",
            wtp.median.lower, wtp.median.upper
        )?;
        if wtp.median.extrapolated {
            write!(f, " (upper bound extrapolated)")?;
        }
        writeln!(f)?;

        for warning in estimate.warnings() {
            writeln!(f, "Warning: {warning}")?;
        }
        Ok(())
    }
}
