//! Core types and configuration for double-bounded WTP estimation.
//!
//! This crate provides shared types used across all other crates:
//! - Survey responses and censoring intervals
//! - NPMLE, survivor curve and WTP result types
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result, Warning};
pub use types::*;
