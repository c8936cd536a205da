//! Parsing collaborators and exporters around the M3EP classifier.
//!
//! Each supported file layout has its own [`source::SeriesParser`]; all of
//! them hand the classifier the same validated
//! [`m3ep_core::series::TimeSeries`]. The [`export`] module turns
//! classification results into JSON reports and per-tier event CSVs.

pub mod bdmep;
pub mod error;
pub mod export;
pub mod funceme;
pub mod source;

pub use error::ParseError;
pub use source::{read_series, Pattern, SeriesParser};
