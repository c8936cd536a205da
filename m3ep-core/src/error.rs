//! Error types for series construction and classification.

use chrono::NaiveDate;

/// Raised when observations cannot form a valid [`crate::series::TimeSeries`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    /// Two observations share the same date.
    #[error("duplicate observation for {0}")]
    DuplicateDate(NaiveDate),

    /// Dates are not in ascending order.
    #[error("observations out of order: {next} follows {previous}")]
    Unsorted {
        previous: NaiveDate,
        next: NaiveDate,
    },

    /// A precipitation value is negative, NaN or infinite.
    #[error("invalid precipitation value {value} on {date} (must be finite and >= 0)")]
    InvalidValue { date: NaiveDate, value: f64 },
}

/// Raised by the extreme event classifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    /// A caller-supplied parameter is outside its valid domain.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Nothing is left to classify after date restriction and zero filtering.
    #[error("insufficient data: {0}")]
    InsufficientData(String),
}
