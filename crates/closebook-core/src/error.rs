use thiserror::Error;

use crate::data_source::SourceError;

/// Validation and contract errors exposed by `closebook-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("figi cannot be empty")]
    EmptyFigi,
    #[error("figi length {len} exceeds max {max}")]
    FigiTooLong { len: usize, max: usize },
    #[error("figi contains invalid character '{ch}' at index {index}")]
    FigiInvalidChar { ch: char, index: usize },

    #[error("invalid instrument kind '{value}', expected one of share, bond, etf, currency, future, option, sp")]
    InvalidInstrumentKind { value: String },

    #[error("invalid day label '{value}', expected MM-DD")]
    InvalidDayLabel { value: String },
    #[error("year {year} is outside the supported range {min}..={max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("at least one year must be requested")]
    EmptyYears,

    #[error("nano fraction {value} must be within (-1e9, 1e9)")]
    NanoOutOfRange { value: i32 },

    #[error("invalid target '{value}', expected one of prod, sandbox")]
    InvalidTarget { value: String },
    #[error("api token is required; set CLOSEBOOK_TINVEST_TOKEN")]
    MissingToken,
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("timeout must be an integer number of milliseconds: '{value}'")]
    InvalidTimeout { value: String },
}

/// Top-level error type for core operations.
///
/// Only [`CoreError::Source`] is treated as recoverable by the batch layer;
/// everything else aborts the run.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
