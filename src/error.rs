//! Error types for the calculator
//!
//! `ValidationError` covers everything a caller can get wrong and maps to a
//! 400 response. `CalcError` covers faults that validated input should never
//! reach; seeing one means the generator itself is wrong.

use thiserror::Error;

/// Internal fault raised by a generator or the document writer
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("schedule date overflow: {start} + {months} months")]
    DateOverflow { start: chrono::NaiveDate, months: u32 },

    #[error("non-finite amount in {0}")]
    NonFinite(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("document encoding error: {0}")]
    Encoding(String),
}

/// Rejected request input
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("request body is empty, JSON data was not provided")]
    MissingBody,

    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid request field: {0}")]
    InvalidField(String),

    #[error("field '{field}' is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },

    #[error("invalid month {month} in 'intermediate_payments' (must be 1..={period})")]
    IntermediateMonth { month: i64, period: u32 },

    #[error("invalid percent {0} in 'intermediate_payments' (must be 0..=100)")]
    IntermediatePercent(f64),

    #[error("duplicate month {0} in 'intermediate_payments'")]
    DuplicateIntermediateMonth(u32),

    #[error("invalid date format: {0}")]
    InvalidDate(String),

    #[error("unknown {field} '{value}'")]
    UnknownOption { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, CalcError>;
