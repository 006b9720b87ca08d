//! Nonparametric maximum-likelihood estimation for interval-censored data.
//!
//! Observations are half-open intervals `(left, right]`; an observation with
//! `left == right` is an exact value. Probability mass can only sit on the
//! maximal intersections of observations (Turnbull intervals), so the
//! estimate is a mass vector over those intersections, found by the
//! self-consistency (EM) fixed point.

use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use wtp_core::config::NpmleConfig;
use wtp_core::{CensoringInterval, Error, NpmleFit, Result, TurnbullInterval};

/// Interval-censored NPMLE backend.
pub trait IntervalCensoredSolver {
    /// Estimate masses over the Turnbull intervals of `intervals`.
    ///
    /// Non-convergence is reported through [`NpmleFit::converged`], not as
    /// an error.
    fn estimate(&self, intervals: &[CensoringInterval]) -> Result<NpmleFit>;
}

// Tie order at equal values: `[x` starts before `x]` ends, which ends before `(x` starts.
const CLOSED_LEFT: u8 = 0;
const CLOSED_RIGHT: u8 = 1;
const OPEN_LEFT: u8 = 2;

/// Position of an interval endpoint on the real line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Endpoint {
    value: OrderedFloat<f64>,
    rank: u8,
}

impl Endpoint {
    fn left_of(interval: &CensoringInterval) -> Self {
        let rank = if interval.left == interval.right {
            CLOSED_LEFT
        } else {
            OPEN_LEFT
        };
        Self {
            value: OrderedFloat(interval.left),
            rank,
        }
    }

    fn right_of(interval: &CensoringInterval) -> Self {
        Self {
            value: OrderedFloat(interval.right),
            rank: CLOSED_RIGHT,
        }
    }
}

type Span = (Endpoint, Endpoint);

/// Maximal intersections: every left endpoint immediately followed by a
/// right endpoint in sorted order.
fn maximal_intersections(spans: &[Span]) -> Vec<Span> {
    let mut marks: Vec<(Endpoint, bool)> = spans
        .iter()
        .flat_map(|&(lower, upper)| [(lower, true), (upper, false)])
        .collect();
    marks.sort_unstable();

    marks
        .windows(2)
        .filter(|w| w[0].1 && !w[1].1)
        .map(|w| (w[0].0, w[1].0))
        .collect()
}

/// Identical observations collapsed into one weighted row.
struct ObservationGroup {
    /// Indices of the Turnbull intervals the observation contains.
    members: Vec<usize>,
    weight: f64,
}

fn log_likelihood(groups: &[ObservationGroup], mass: &[f64]) -> f64 {
    groups
        .iter()
        .map(|g| {
            let covered: f64 = g.members.iter().map(|&j| mass[j]).sum();
            g.weight * covered.ln()
        })
        .sum()
}

/// Self-consistent EM estimator for the Turnbull NPMLE.
#[derive(Debug, Clone, Default)]
pub struct SelfConsistentSolver {
    config: NpmleConfig,
}

impl SelfConsistentSolver {
    /// Create a new solver.
    pub fn new(config: NpmleConfig) -> Self {
        Self { config }
    }

    fn group_observations(
        intervals: &[CensoringInterval],
        cliques: &[Span],
    ) -> Result<Vec<ObservationGroup>> {
        let mut counts: BTreeMap<Span, usize> = BTreeMap::new();
        for interval in intervals {
            let span = (Endpoint::left_of(interval), Endpoint::right_of(interval));
            *counts.entry(span).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|((lower, upper), count)| {
                let members: Vec<usize> = cliques
                    .iter()
                    .enumerate()
                    .filter(|(_, (a, b))| lower <= *a && *b <= upper)
                    .map(|(j, _)| j)
                    .collect();
                if members.is_empty() {
                    return Err(Error::estimation(format!(
                        "interval ({}, {}] contains no Turnbull interval",
                        lower.value, upper.value
                    )));
                }
                Ok(ObservationGroup {
                    members,
                    weight: count as f64,
                })
            })
            .collect()
    }
}

impl IntervalCensoredSolver for SelfConsistentSolver {
    fn estimate(&self, intervals: &[CensoringInterval]) -> Result<NpmleFit> {
        if intervals.is_empty() {
            return Err(Error::data("no censoring intervals to estimate from"));
        }

        let spans: Vec<Span> = intervals
            .iter()
            .map(|i| (Endpoint::left_of(i), Endpoint::right_of(i)))
            .collect();
        let cliques = maximal_intersections(&spans);
        let groups = Self::group_observations(intervals, &cliques)?;
        let n = intervals.len() as f64;
        let m = cliques.len();

        debug!(
            observations = intervals.len(),
            distinct = groups.len(),
            turnbull_intervals = m,
            "starting NPMLE"
        );

        let mut mass = vec![1.0 / m as f64; m];
        let mut log_lik = log_likelihood(&groups, &mass);
        let mut last_improvement = 0.0;
        let mut iterations = 0u32;
        let mut converged = false;
        let max_iterations = self.config.max_iterations.max(1);

        while iterations < max_iterations {
            iterations += 1;

            let mut next = vec![0.0; m];
            for group in &groups {
                let covered: f64 = group.members.iter().map(|&j| mass[j]).sum();
                if covered <= 0.0 {
                    return Err(Error::estimation(
                        "observation lost all probability mass during EM",
                    ));
                }
                let scale = group.weight / covered;
                for &j in &group.members {
                    next[j] += scale * mass[j];
                }
            }
            for p in &mut next {
                *p /= n;
            }

            let next_log_lik = log_likelihood(&groups, &next);
            last_improvement = next_log_lik - log_lik;
            mass = next;
            log_lik = next_log_lik;

            if last_improvement.abs() < self.config.tolerance {
                converged = true;
                break;
            }
        }

        if converged {
            debug!(iterations, log_lik, "NPMLE converged");
        } else {
            warn!(
                iterations,
                last_improvement, "NPMLE hit the iteration cap before converging"
            );
        }

        let total: f64 = mass.iter().sum();
        let intervals = cliques
            .iter()
            .zip(&mass)
            .map(|((lower, upper), &p)| TurnbullInterval {
                left: lower.value.0,
                right: upper.value.0,
                mass: p / total,
            })
            .collect();

        Ok(NpmleFit {
            intervals,
            converged,
            iterations,
            log_likelihood: log_lik,
            last_improvement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn interval(left: f64, right: f64) -> CensoringInterval {
        CensoringInterval::new(left, right).unwrap()
    }

    #[test]
    fn test_disjoint_intervals_split_mass() {
        let solver = SelfConsistentSolver::default();
        let fit = solver
            .estimate(&[interval(10.0, 20.0), interval(5.0, 10.0)])
            .unwrap();

        assert!(fit.converged);
        assert_eq!(fit.intervals.len(), 2);
        assert_eq!((fit.intervals[0].left, fit.intervals[0].right), (5.0, 10.0));
        assert_eq!((fit.intervals[1].left, fit.intervals[1].right), (10.0, 20.0));
        assert_abs_diff_eq!(fit.intervals[0].mass, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intervals[1].mass, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.log_likelihood, 2.0 * 0.5f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_overlapping_intervals() {
        // Likelihood p1 (p1 + p2) (p2 + p3) p3 peaks at p = (1/2, 0, 1/2).
        let solver = SelfConsistentSolver::default();
        let fit = solver
            .estimate(&[
                interval(0.0, 1.0),
                interval(0.0, 2.0),
                interval(1.0, 3.0),
                interval(2.0, f64::INFINITY),
            ])
            .unwrap();

        let bounds: Vec<(f64, f64)> = fit.intervals.iter().map(|t| (t.left, t.right)).collect();
        assert_eq!(bounds, vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
        assert!(fit.converged);
        assert_abs_diff_eq!(fit.intervals[0].mass, 0.5, epsilon = 1e-2);
        assert_abs_diff_eq!(fit.intervals[1].mass, 0.0, epsilon = 1e-2);
        assert_abs_diff_eq!(fit.intervals[2].mass, 0.5, epsilon = 1e-2);
        assert_abs_diff_eq!(fit.total_mass(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_right_censored_sample_puts_mass_above_largest_bid() {
        let solver = SelfConsistentSolver::default();
        let fit = solver
            .estimate(&[
                interval(20.0, f64::INFINITY),
                interval(40.0, f64::INFINITY),
                interval(20.0, f64::INFINITY),
            ])
            .unwrap();

        assert_eq!(fit.intervals.len(), 1);
        assert_eq!(fit.intervals[0].left, 40.0);
        assert!(fit.intervals[0].right.is_infinite());
        assert_abs_diff_eq!(fit.intervals[0].mass, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_exact_observation_is_a_point() {
        let solver = SelfConsistentSolver::default();
        let fit = solver
            .estimate(&[interval(5.0, 5.0), interval(0.0, 10.0)])
            .unwrap();

        assert_eq!(fit.intervals.len(), 1);
        assert_eq!((fit.intervals[0].left, fit.intervals[0].right), (5.0, 5.0));
        assert_abs_diff_eq!(fit.intervals[0].mass, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        // (0, 5] and (5, 10] share only the endpoint 5, which (5, 10] excludes.
        let cliques = maximal_intersections(&[
            (Endpoint::left_of(&interval(0.0, 5.0)), Endpoint::right_of(&interval(0.0, 5.0))),
            (Endpoint::left_of(&interval(5.0, 10.0)), Endpoint::right_of(&interval(5.0, 10.0))),
        ]);
        assert_eq!(cliques.len(), 2);
    }

    #[test]
    fn test_iteration_cap_reports_non_convergence() {
        let solver = SelfConsistentSolver::new(NpmleConfig {
            max_iterations: 1,
            tolerance: 1e-12,
        });
        let fit = solver
            .estimate(&[
                interval(0.0, 1.0),
                interval(0.0, 2.0),
                interval(1.0, 3.0),
                interval(2.0, f64::INFINITY),
            ])
            .unwrap();

        assert!(!fit.converged);
        assert_eq!(fit.iterations, 1);
        assert!(fit.last_improvement > 0.0);
        assert_abs_diff_eq!(fit.total_mass(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_duplicates_weight_the_fit() {
        let solver = SelfConsistentSolver::default();
        let fit = solver
            .estimate(&[
                interval(0.0, 5.0),
                interval(0.0, 5.0),
                interval(0.0, 5.0),
                interval(5.0, 10.0),
            ])
            .unwrap();

        assert_abs_diff_eq!(fit.intervals[0].mass, 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intervals[1].mass, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_input_is_data_error() {
        let solver = SelfConsistentSolver::default();
        assert!(matches!(solver.estimate(&[]), Err(Error::Data(_))));
    }
}
