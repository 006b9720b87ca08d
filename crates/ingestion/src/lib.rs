//! Data ingestion and normalization for WTP estimation.
//!
//! This crate handles:
//! - Decoding answer encodings (booleans, 0/1 codes, yes/no labels)
//! - Dropping rows with missing values
//! - Building censoring intervals and the distinct bid set

pub mod interval_builder;
pub mod normalizer;
pub mod record;

pub use interval_builder::IntervalBuilder;
pub use normalizer::{IngestionStats, ResponseNormalizer};
pub use record::{decode_answer, read_records_file, read_records_json, RawAnswer, RawRecord};
