//! Core data types for double-bounded WTP estimation.

use crate::error::{Error, Result, Warning};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Bid amount offered to a respondent.
pub type Bid = f64;

/// Normalized answer to a single bid question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    /// Respondent accepted the bid.
    Yes,
    /// Respondent rejected the bid.
    No,
    /// An answer was recorded but its encoding could not be decoded.
    Unrecognized,
}

/// The four-way answer pattern of a double-bounded question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponsePattern {
    YesYes,
    YesNo,
    NoYes,
    NoNo,
    /// At least one answer was unrecognized.
    Unmatched,
}

/// One respondent's answers to the first and follow-up bid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// First bid offered.
    pub first_bid: Bid,
    /// Follow-up bid (higher after a yes, lower after a no).
    pub second_bid: Bid,
    /// Answer to the first bid.
    pub answer1: Answer,
    /// Answer to the follow-up bid.
    pub answer2: Answer,
}

impl Response {
    /// Create a response from boolean answers.
    pub fn new(first_bid: Bid, second_bid: Bid, yes1: bool, yes2: bool) -> Self {
        let answer = |yes: bool| if yes { Answer::Yes } else { Answer::No };
        Self {
            first_bid,
            second_bid,
            answer1: answer(yes1),
            answer2: answer(yes2),
        }
    }

    /// Classify the answer pair.
    pub fn pattern(&self) -> ResponsePattern {
        match (self.answer1, self.answer2) {
            (Answer::Yes, Answer::Yes) => ResponsePattern::YesYes,
            (Answer::Yes, Answer::No) => ResponsePattern::YesNo,
            (Answer::No, Answer::Yes) => ResponsePattern::NoYes,
            (Answer::No, Answer::No) => ResponsePattern::NoNo,
            _ => ResponsePattern::Unmatched,
        }
    }
}

/// Tally of answer patterns in a sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCounts {
    pub yes_yes: usize,
    pub yes_no: usize,
    pub no_yes: usize,
    pub no_no: usize,
    pub unmatched: usize,
}

impl PatternCounts {
    /// Count one more response with the given pattern.
    pub fn record(&mut self, pattern: ResponsePattern) {
        match pattern {
            ResponsePattern::YesYes => self.yes_yes += 1,
            ResponsePattern::YesNo => self.yes_no += 1,
            ResponsePattern::NoYes => self.no_yes += 1,
            ResponsePattern::NoNo => self.no_no += 1,
            ResponsePattern::Unmatched => self.unmatched += 1,
        }
    }

    /// Total responses counted.
    pub fn total(&self) -> usize {
        self.yes_yes + self.yes_no + self.no_yes + self.no_no + self.unmatched
    }
}

/// Interval `(left, right]` known to contain a respondent's WTP.
///
/// `left == 0` means no lower bound, `right == +inf` means no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CensoringInterval {
    pub left: f64,
    pub right: f64,
}

impl CensoringInterval {
    /// Create a validated censoring interval.
    pub fn new(left: f64, right: f64) -> Result<Self> {
        if !left.is_finite() || left < 0.0 {
            return Err(Error::data(format!(
                "left bound must be finite and non-negative, got {left}"
            )));
        }
        if right.is_nan() || right <= 0.0 {
            return Err(Error::data(format!(
                "right bound must be positive, got {right}"
            )));
        }
        if left > right {
            return Err(Error::data(format!(
                "left bound {left} exceeds right bound {right}"
            )));
        }
        Ok(Self { left, right })
    }

    /// The interval carrying no information, `(0, +inf)`.
    pub fn unbounded() -> Self {
        Self {
            left: 0.0,
            right: f64::INFINITY,
        }
    }

    /// WTP exceeds every bid offered.
    #[inline]
    pub fn is_right_censored(&self) -> bool {
        self.right.is_infinite()
    }

    /// WTP is below every bid offered.
    #[inline]
    pub fn is_left_censored(&self) -> bool {
        self.left == 0.0
    }
}

/// Sorted unique interval endpoints, always terminated by `+inf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistinctBidSet {
    values: Vec<f64>,
}

impl DistinctBidSet {
    /// Build from arbitrary endpoints; duplicates are removed and the
    /// `+inf` sentinel is appended when missing.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Result<Self> {
        let mut sorted: Vec<OrderedFloat<f64>> = Vec::new();
        for value in values {
            if value.is_nan() {
                return Err(Error::data("bid set contains NaN"));
            }
            sorted.push(OrderedFloat(value));
        }
        sorted.sort_unstable();
        sorted.dedup();

        let mut values: Vec<f64> = sorted.into_iter().map(|v| v.0).collect();
        if values.iter().all(|v| v.is_infinite()) {
            return Err(Error::data("no finite distinct bids"));
        }
        if values.last().copied() != Some(f64::INFINITY) {
            values.push(f64::INFINITY);
        }
        Ok(Self { values })
    }

    /// All values including the sentinel.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Values excluding the `+inf` sentinel.
    pub fn finite(&self) -> &[f64] {
        &self.values[..self.values.len() - 1]
    }

    /// Number of values including the sentinel.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest finite bid.
    pub fn max_finite(&self) -> f64 {
        self.finite().last().copied().unwrap_or(0.0)
    }

    /// Whether `value` is an element of the set.
    pub fn contains(&self, value: f64) -> bool {
        self.values
            .binary_search_by(|v| OrderedFloat(*v).cmp(&OrderedFloat(value)))
            .is_ok()
    }
}

/// Output of the Interval Builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CensoredData {
    /// One interval per respondent, in input order.
    pub intervals: Vec<CensoringInterval>,
    /// Distinct endpoints of all intervals.
    pub bids: DistinctBidSet,
    /// Answer-pattern tally.
    pub patterns: PatternCounts,
}

/// A maximal intersection carrying NPMLE probability mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnbullInterval {
    pub left: f64,
    pub right: f64,
    /// Estimated probability mass.
    pub mass: f64,
}

/// Nonparametric maximum-likelihood fit over Turnbull intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpmleFit {
    /// Turnbull intervals ordered by position.
    pub intervals: Vec<TurnbullInterval>,
    /// Whether the EM loop met its tolerance before the iteration cap.
    pub converged: bool,
    /// EM iterations performed.
    pub iterations: u32,
    /// Log-likelihood at the returned estimate.
    pub log_likelihood: f64,
    /// Log-likelihood change of the final iteration.
    pub last_improvement: f64,
}

impl NpmleFit {
    /// Sum of estimated masses (1 up to rounding).
    pub fn total_mass(&self) -> f64 {
        self.intervals.iter().map(|i| i.mass).sum()
    }
}

/// One step of the reconciled survivor function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurvivalPoint {
    pub bid: f64,
    /// Probability that WTP exceeds `bid`.
    pub survival: f64,
}

/// Survivor step function over every finite distinct bid, starting at bid 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalCurve {
    pub points: Vec<SurvivalPoint>,
}

impl SurvivalCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bids in increasing order.
    pub fn bids(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.bid)
    }

    /// Survival values in bid order.
    pub fn survival(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.survival)
    }

    /// Survival at `bid`, holding the last step for bids between grid points.
    pub fn survival_at(&self, bid: f64) -> f64 {
        self.points
            .iter()
            .take_while(|p| p.bid <= bid)
            .last()
            .map(|p| p.survival)
            .unwrap_or(1.0)
    }

    /// Check that survival never increases along the grid.
    pub fn is_non_increasing(&self) -> bool {
        self.points.windows(2).all(|w| w[1].survival <= w[0].survival)
    }
}

/// Bracketing bids for the median WTP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MedianBounds {
    /// Largest bid with survival above the median level.
    pub lower: f64,
    /// Smallest bid with survival below the median level.
    pub upper: f64,
    /// `upper` is a nominal extrapolation past the largest bid.
    pub extrapolated: bool,
}

/// Summary WTP statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WtpEstimate {
    /// Kaplan-Meier (lower bound) mean.
    pub mean_km: f64,
    /// Spearman-Karber mean.
    pub mean_sk: f64,
    pub median: MedianBounds,
}

/// Result of one estimation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnbullEstimate {
    /// Respondents used in the fit.
    pub n_obs: usize,
    /// Rows dropped for missing values before the fit.
    pub dropped_rows: usize,
    pub data: CensoredData,
    pub fit: NpmleFit,
    pub curve: SurvivalCurve,
    pub wtp: WtpEstimate,
}

impl TurnbullEstimate {
    /// Whether the NPMLE converged.
    pub fn converged(&self) -> bool {
        self.fit.converged
    }

    /// Non-fatal conditions callers should surface.
    pub fn warnings(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();
        if !self.fit.converged {
            warnings.push(Warning::NotConverged {
                iterations: self.fit.iterations,
                last_improvement: self.fit.last_improvement,
            });
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_pattern() {
        assert_eq!(Response::new(10.0, 20.0, true, true).pattern(), ResponsePattern::YesYes);
        assert_eq!(Response::new(10.0, 20.0, true, false).pattern(), ResponsePattern::YesNo);
        assert_eq!(Response::new(10.0, 5.0, false, true).pattern(), ResponsePattern::NoYes);
        assert_eq!(Response::new(10.0, 5.0, false, false).pattern(), ResponsePattern::NoNo);

        let odd = Response {
            first_bid: 10.0,
            second_bid: 5.0,
            answer1: Answer::Unrecognized,
            answer2: Answer::No,
        };
        assert_eq!(odd.pattern(), ResponsePattern::Unmatched);
    }

    #[test]
    fn test_interval_validation() {
        assert!(CensoringInterval::new(5.0, 10.0).is_ok());
        assert!(CensoringInterval::new(0.0, f64::INFINITY).is_ok());
        assert!(CensoringInterval::new(10.0, 5.0).is_err());
        assert!(CensoringInterval::new(-1.0, 5.0).is_err());
        assert!(CensoringInterval::new(0.0, 0.0).is_err());
        assert!(CensoringInterval::new(f64::NAN, 5.0).is_err());
    }

    #[test]
    fn test_unbounded_interval() {
        let interval = CensoringInterval::unbounded();
        assert!(interval.is_left_censored());
        assert!(interval.is_right_censored());
    }

    #[test]
    fn test_distinct_bid_set_appends_sentinel() {
        let bids = DistinctBidSet::from_values([20.0, 5.0, 10.0, 10.0, 5.0]).unwrap();
        assert_eq!(bids.as_slice(), &[5.0, 10.0, 20.0, f64::INFINITY]);
        assert_eq!(bids.finite(), &[5.0, 10.0, 20.0]);
        assert_eq!(bids.max_finite(), 20.0);
        assert!(bids.contains(10.0));
        assert!(!bids.contains(15.0));
    }

    #[test]
    fn test_distinct_bid_set_keeps_single_sentinel() {
        let bids = DistinctBidSet::from_values([f64::INFINITY, 5.0, f64::INFINITY]).unwrap();
        assert_eq!(bids.as_slice(), &[5.0, f64::INFINITY]);
    }

    #[test]
    fn test_distinct_bid_set_rejects_empty() {
        assert!(DistinctBidSet::from_values(Vec::new()).is_err());
        assert!(DistinctBidSet::from_values([f64::INFINITY]).is_err());
    }

    #[test]
    fn test_survival_at_holds_last_step() {
        let curve = SurvivalCurve {
            points: vec![
                SurvivalPoint { bid: 0.0, survival: 1.0 },
                SurvivalPoint { bid: 10.0, survival: 0.6 },
                SurvivalPoint { bid: 20.0, survival: 0.2 },
            ],
        };
        assert_eq!(curve.survival_at(15.0), 0.6);
        assert_eq!(curve.survival_at(25.0), 0.2);
        assert!(curve.is_non_increasing());
    }

    #[test]
    fn test_pattern_counts() {
        let mut counts = PatternCounts::default();
        counts.record(ResponsePattern::YesNo);
        counts.record(ResponsePattern::YesNo);
        counts.record(ResponsePattern::Unmatched);
        assert_eq!(counts.yes_no, 2);
        assert_eq!(counts.total(), 3);
    }
}
