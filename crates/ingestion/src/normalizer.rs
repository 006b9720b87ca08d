//! Row-level validation of raw survey tables.
//!
//! Decodes answers, drops rows with missing cells and keeps a count of what
//! was dropped so callers can report it.

use crate::record::{decode_answer, RawRecord};
use tracing::{debug, warn};
use wtp_core::{Answer, Error, Response, Result};

/// Statistics about a normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionStats {
    /// Rows seen.
    pub total_rows: usize,
    /// Rows turned into responses.
    pub kept_rows: usize,
    /// Rows dropped for a missing bid or answer.
    pub dropped_rows: usize,
    /// Answers present in an encoding that could not be decoded.
    pub unrecognized_answers: usize,
}

impl IngestionStats {
    /// Fraction of rows dropped.
    pub fn dropped_frac(&self) -> f64 {
        if self.total_rows > 0 {
            self.dropped_rows as f64 / self.total_rows as f64
        } else {
            0.0
        }
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Turns raw rows into normalized [`Response`]s.
#[derive(Debug, Default)]
pub struct ResponseNormalizer {
    stats: IngestionStats,
}

impl ResponseNormalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a single row. Returns `None` when the row must be dropped.
    pub fn normalize(&mut self, record: &RawRecord) -> Option<Response> {
        self.stats.total_rows += 1;

        let response = self.decode(record);
        match response {
            Some(_) => self.stats.kept_rows += 1,
            None => self.stats.dropped_rows += 1,
        }
        response
    }

    fn decode(&mut self, record: &RawRecord) -> Option<Response> {
        let first_bid = record.first_bid.filter(|b| !b.is_nan())?;
        let second_bid = record.second_bid.filter(|b| !b.is_nan())?;
        let answer1 = decode_answer(record.answer1.as_ref()?)?;
        let answer2 = decode_answer(record.answer2.as_ref()?)?;

        for answer in [answer1, answer2] {
            if answer == Answer::Unrecognized {
                self.stats.unrecognized_answers += 1;
            }
        }

        Some(Response {
            first_bid,
            second_bid,
            answer1,
            answer2,
        })
    }

    /// Normalize a whole table.
    ///
    /// Dropping rows is not an error; dropping every row is.
    pub fn normalize_batch(&mut self, records: &[RawRecord]) -> Result<Vec<Response>> {
        if records.is_empty() {
            return Err(Error::data("input table has no rows"));
        }

        let before = self.stats.clone();
        let responses: Vec<Response> = records.iter().filter_map(|r| self.normalize(r)).collect();

        let dropped = self.stats.dropped_rows - before.dropped_rows;
        let unrecognized = self.stats.unrecognized_answers - before.unrecognized_answers;
        if dropped > 0 {
            warn!(dropped, total = records.len(), "dropped rows with missing values");
        }
        if unrecognized > 0 {
            warn!(
                unrecognized,
                "answers in an unrecognized encoding are treated as carrying no information"
            );
        }
        if responses.is_empty() {
            return Err(Error::data(format!(
                "all {dropped} rows dropped for missing values"
            )));
        }

        debug!(kept = responses.len(), dropped, "normalized response table");
        Ok(responses)
    }

    /// Get normalization statistics.
    pub fn stats(&self) -> &IngestionStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}
