//! Censoring intervals from double-bounded responses.
//!
//! | answer1 | answer2 | left | right |
//! |---------|---------|------|-------|
//! | yes     | yes     | bid2 | +inf  |
//! | yes     | no      | bid1 | bid2  |
//! | no      | yes     | bid2 | bid1  |
//! | no      | no      | 0    | bid2  |
//!
//! Any other combination maps to `(0, +inf)`.

use ordered_float::OrderedFloat;
use std::collections::BTreeSet;
use tracing::{debug, warn};
use wtp_core::{
    CensoredData, CensoringInterval, DistinctBidSet, Error, PatternCounts, Response,
    ResponsePattern, Result,
};

/// Builds censoring intervals and the distinct bid set for a sample.
#[derive(Debug, Default)]
pub struct IntervalBuilder {
    /// Interval endpoints seen so far.
    endpoints: BTreeSet<OrderedFloat<f64>>,
    intervals: Vec<CensoringInterval>,
    patterns: PatternCounts,
}

impl IntervalBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map one response to its censoring interval.
    pub fn interval_for(response: &Response) -> Result<CensoringInterval> {
        for bid in [response.first_bid, response.second_bid] {
            if !bid.is_finite() || bid < 0.0 {
                return Err(Error::data(format!(
                    "bids must be finite and non-negative, got {bid}"
                )));
            }
        }

        let bid1 = response.first_bid;
        let bid2 = response.second_bid;
        match response.pattern() {
            ResponsePattern::YesYes => CensoringInterval::new(bid2, f64::INFINITY),
            ResponsePattern::YesNo => CensoringInterval::new(bid1, bid2),
            ResponsePattern::NoYes => CensoringInterval::new(bid2, bid1),
            ResponsePattern::NoNo => CensoringInterval::new(0.0, bid2),
            ResponsePattern::Unmatched => Ok(CensoringInterval::unbounded()),
        }
    }

    /// Add one response.
    pub fn add_response(&mut self, response: &Response) -> Result<()> {
        let interval = Self::interval_for(response)?;
        self.patterns.record(response.pattern());
        self.endpoints.insert(OrderedFloat(interval.left));
        self.endpoints.insert(OrderedFloat(interval.right));
        self.intervals.push(interval);
        Ok(())
    }

    /// Number of intervals built so far.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Finish the sample.
    pub fn finish(self) -> Result<CensoredData> {
        if self.intervals.is_empty() {
            return Err(Error::data("no responses to build intervals from"));
        }
        if self.patterns.unmatched > 0 {
            warn!(
                unmatched = self.patterns.unmatched,
                "unmatched answer patterns mapped to the no-information interval"
            );
        }

        let bids = DistinctBidSet::from_values(self.endpoints.into_iter().map(|v| v.0))?;
        debug!(
            intervals = self.intervals.len(),
            distinct_bids = bids.len(),
            "built censoring intervals"
        );

        Ok(CensoredData {
            intervals: self.intervals,
            bids,
            patterns: self.patterns,
        })
    }

    /// Build intervals for a whole sample.
    ///
    /// Fails on the first inconsistent response, naming its row.
    pub fn build(responses: &[Response]) -> Result<CensoredData> {
        let mut builder = Self::new();
        for (row, response) in responses.iter().enumerate() {
            builder.add_response(response).map_err(|e| match e {
                Error::Data(msg) => Error::data(format!("row {row}: {msg}")),
                other => other,
            })?;
        }
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wtp_core::Answer;

    #[test]
    fn test_rule_table() {
        let yy = IntervalBuilder::interval_for(&Response::new(10.0, 20.0, true, true)).unwrap();
        assert_eq!((yy.left, yy.right), (20.0, f64::INFINITY));

        let yn = IntervalBuilder::interval_for(&Response::new(10.0, 20.0, true, false)).unwrap();
        assert_eq!((yn.left, yn.right), (10.0, 20.0));

        let ny = IntervalBuilder::interval_for(&Response::new(10.0, 5.0, false, true)).unwrap();
        assert_eq!((ny.left, ny.right), (5.0, 10.0));

        let nn = IntervalBuilder::interval_for(&Response::new(10.0, 5.0, false, false)).unwrap();
        assert_eq!((nn.left, nn.right), (0.0, 5.0));
    }

    #[test]
    fn test_unmatched_pattern_carries_no_information() {
        let response = Response {
            first_bid: 10.0,
            second_bid: 20.0,
            answer1: Answer::Yes,
            answer2: Answer::Unrecognized,
        };
        let interval = IntervalBuilder::interval_for(&response).unwrap();
        assert_eq!(interval, CensoringInterval::unbounded());
    }

    #[test]
    fn test_two_respondent_scenario() {
        let responses = [
            Response::new(10.0, 20.0, true, false),
            Response::new(10.0, 5.0, false, true),
        ];

        let data = IntervalBuilder::build(&responses).unwrap();

        assert_eq!(data.intervals[0], CensoringInterval { left: 10.0, right: 20.0 });
        assert_eq!(data.intervals[1], CensoringInterval { left: 5.0, right: 10.0 });
        assert_eq!(data.bids.as_slice(), &[5.0, 10.0, 20.0, f64::INFINITY]);
        assert_eq!(data.patterns.yes_no, 1);
        assert_eq!(data.patterns.no_yes, 1);
    }

    #[test]
    fn test_bid_set_includes_zero_for_no_no() {
        let data = IntervalBuilder::build(&[Response::new(10.0, 5.0, false, false)]).unwrap();
        assert_eq!(data.bids.as_slice(), &[0.0, 5.0, f64::INFINITY]);
    }

    #[test]
    fn test_inconsistent_follow_up_bid_is_data_error() {
        // A yes followed by a lower bid gives left > right.
        let responses = [
            Response::new(10.0, 20.0, true, false),
            Response::new(10.0, 5.0, true, false),
        ];
        let err = IntervalBuilder::build(&responses).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_negative_bid_is_data_error() {
        let err = IntervalBuilder::interval_for(&Response::new(-1.0, 5.0, false, false));
        assert!(err.is_err());
    }

    #[test]
    fn test_empty_sample_is_data_error() {
        assert!(matches!(IntervalBuilder::build(&[]), Err(Error::Data(_))));
    }
}
