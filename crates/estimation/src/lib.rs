//! Turnbull estimation of double-bounded WTP distributions.
//!
//! This crate handles:
//! - Interval-censored NPMLE over Turnbull intervals
//! - Reconciling the fit with the full bid grid
//! - Kaplan-Meier and Spearman-Karber means, median bounds
//! - Text reports

pub mod engine;
pub mod npmle;
pub mod reconciler;
pub mod report;
pub mod summarizer;

pub use engine::TurnbullEngine;
pub use npmle::{IntervalCensoredSolver, SelfConsistentSolver};
pub use reconciler::SurvivorReconciler;
pub use report::{SummaryReport, SurvivalTable};
pub use summarizer::WtpSummarizer;
