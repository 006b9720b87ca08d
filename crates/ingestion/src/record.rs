//! Raw survey rows and answer decoding.
//!
//! Survey tables encode answers as booleans, 0/1 codes or "yes"/"no"
//! labels. Everything is decoded into [`Answer`] here so the rest of the
//! pipeline only ever sees one representation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use wtp_core::{Answer, Result};

/// An answer as it appears in the input table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswer {
    Flag(bool),
    Code(i64),
    Numeric(f64),
    Label(String),
}

/// One unvalidated table row. `None` marks a missing cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub first_bid: Option<f64>,
    #[serde(default)]
    pub second_bid: Option<f64>,
    #[serde(default)]
    pub answer1: Option<RawAnswer>,
    #[serde(default)]
    pub answer2: Option<RawAnswer>,
}

impl RawRecord {
    /// Build a complete row from boolean answers.
    pub fn from_flags(first_bid: f64, second_bid: f64, yes1: bool, yes2: bool) -> Self {
        Self {
            first_bid: Some(first_bid),
            second_bid: Some(second_bid),
            answer1: Some(RawAnswer::Flag(yes1)),
            answer2: Some(RawAnswer::Flag(yes2)),
        }
    }
}

/// Decode a raw answer.
///
/// Returns `None` for a missing value (empty, `NA`, `NaN`) and
/// `Some(Answer::Unrecognized)` for a present value in an unknown encoding.
pub fn decode_answer(raw: &RawAnswer) -> Option<Answer> {
    match raw {
        RawAnswer::Flag(true) => Some(Answer::Yes),
        RawAnswer::Flag(false) => Some(Answer::No),
        RawAnswer::Code(1) => Some(Answer::Yes),
        RawAnswer::Code(0) => Some(Answer::No),
        RawAnswer::Code(_) => Some(Answer::Unrecognized),
        RawAnswer::Numeric(v) if v.is_nan() => None,
        RawAnswer::Numeric(v) if *v == 1.0 => Some(Answer::Yes),
        RawAnswer::Numeric(v) if *v == 0.0 => Some(Answer::No),
        RawAnswer::Numeric(_) => Some(Answer::Unrecognized),
        RawAnswer::Label(label) => match label.trim().to_ascii_lowercase().as_str() {
            "" | "na" | "nan" => None,
            "yes" | "y" | "true" | "1" => Some(Answer::Yes),
            "no" | "n" | "false" | "0" => Some(Answer::No),
            _ => Some(Answer::Unrecognized),
        },
    }
}

/// Parse a JSON array of rows.
pub fn read_records_json(json: &str) -> Result<Vec<RawRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Read a JSON array of rows from a file.
pub fn read_records_file(path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let json = std::fs::read_to_string(path)?;
    read_records_json(&json)
}
