//! Turnbull estimation engine.
//!
//! Combines the interval builder, NPMLE solver, reconciler and summarizer
//! into one pass over a response table.

use crate::{
    npmle::{IntervalCensoredSolver, SelfConsistentSolver},
    reconciler::SurvivorReconciler,
    summarizer::WtpSummarizer,
};
use tracing::{debug, warn};
use wtp_core::{CensoredData, Config, Response, Result, TurnbullEstimate};
use wtp_ingestion::{IntervalBuilder, RawRecord, ResponseNormalizer};

/// Double-bounded Turnbull WTP estimation engine.
pub struct TurnbullEngine<S = SelfConsistentSolver> {
    /// NPMLE backend.
    solver: S,
    /// Survivor curve reconciler.
    reconciler: SurvivorReconciler,
    /// WTP summarizer.
    summarizer: WtpSummarizer,
}

impl TurnbullEngine {
    /// Create an engine with the built-in EM solver.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_solver(config, SelfConsistentSolver::new(config.npmle.clone()))
    }
}

impl<S: IntervalCensoredSolver> TurnbullEngine<S> {
    /// Create an engine with a custom NPMLE backend.
    pub fn with_solver(config: &Config, solver: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            solver,
            reconciler: SurvivorReconciler::new(&config.survival),
            summarizer: WtpSummarizer::new(config.summary.clone()),
        })
    }

    /// Estimate from raw table rows, dropping rows with missing values.
    pub fn estimate_records(&self, records: &[RawRecord]) -> Result<TurnbullEstimate> {
        let mut normalizer = ResponseNormalizer::new();
        let responses = normalizer.normalize_batch(records)?;
        self.run(&responses, normalizer.stats().dropped_rows)
    }

    /// Estimate from normalized responses.
    pub fn estimate(&self, responses: &[Response]) -> Result<TurnbullEstimate> {
        self.run(responses, 0)
    }

    fn run(&self, responses: &[Response], dropped_rows: usize) -> Result<TurnbullEstimate> {
        let data = IntervalBuilder::build(responses)?;
        self.estimate_intervals(data, dropped_rows)
    }

    /// Estimate from already-built censoring intervals.
    pub fn estimate_intervals(
        &self,
        data: CensoredData,
        dropped_rows: usize,
    ) -> Result<TurnbullEstimate> {
        let fit = self.solver.estimate(&data.intervals)?;
        if !fit.converged {
            warn!(
                iterations = fit.iterations,
                "using the last NPMLE iterate; WTP statistics may be unreliable"
            );
        }

        let curve = self.reconciler.reconcile(&data.bids, &fit)?;
        let wtp = self.summarizer.summarize(&curve)?;

        debug!(
            n_obs = data.intervals.len(),
            mean_km = wtp.mean_km,
            mean_sk = wtp.mean_sk,
            "estimated WTP"
        );

        Ok(TurnbullEstimate {
            n_obs: data.intervals.len(),
            dropped_rows,
            data,
            fit,
            curve,
            wtp,
        })
    }
}
