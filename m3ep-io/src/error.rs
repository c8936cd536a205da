use m3ep_core::error::SeriesError;

/// Errors raised while turning a precipitation file into a time series.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A column the layout requires is absent from the header.
    #[error("missing required column `{0}`")]
    MissingColumn(String),

    /// A date cell does not match `YYYY-MM-DD`.
    #[error("line {line}: invalid date `{value}` (expected YYYY-MM-DD)")]
    InvalidDate { line: u64, value: String },

    /// A precipitation cell is not a non-negative decimal number.
    #[error("line {line}: invalid precipitation value `{value}`")]
    InvalidValue { line: u64, value: String },

    /// The file has a header but no data rows.
    #[error("file contains no data rows")]
    Empty,

    /// The layout name is not one of the supported patterns.
    #[error("unknown file pattern `{0}` (expected `funceme` or `bdmep`)")]
    UnknownPattern(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Series(#[from] SeriesError),
}
