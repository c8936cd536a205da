use crate::bdmep::BdmepParser;
use crate::error::ParseError;
use crate::funceme::FuncemeParser;
use chrono::NaiveDate;
use log::{info, warn};
use m3ep_core::series::{Observation, TimeSeries};
use m3ep_utils::dates::DATE_FORMAT;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Anything that can turn file contents into a validated daily series.
pub trait SeriesParser {
    fn parse(&self, input: &str) -> Result<TimeSeries, ParseError>;
}

/// Known precipitation file layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pattern {
    /// INMET BDMEP export: metadata preamble, `Data Medicao;<precip>;`.
    Bdmep,
    /// FUNCEME rain gauge export: `id;posto;<precip>;data`.
    #[default]
    Funceme,
}

impl Pattern {
    pub fn parser(&self) -> &'static dyn SeriesParser {
        match self {
            Pattern::Bdmep => &BdmepParser,
            Pattern::Funceme => &FuncemeParser,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Bdmep => write!(f, "bdmep"),
            Pattern::Funceme => write!(f, "funceme"),
        }
    }
}

impl FromStr for Pattern {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bdmep" => Ok(Pattern::Bdmep),
            "funceme" => Ok(Pattern::Funceme),
            _ => Err(ParseError::UnknownPattern(s.to_string())),
        }
    }
}

/// Read a precipitation file from disk and parse it with `pattern`.
pub fn read_series(path: &Path, pattern: Pattern) -> Result<TimeSeries, ParseError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let series = pattern.parser().parse(&contents)?;
    info!(
        "Read {} daily observations from {} ({} layout)",
        series.len(),
        path.display(),
        pattern
    );
    Ok(series)
}

pub(crate) fn parse_date_cell(cell: &str, line: u64) -> Result<NaiveDate, ParseError> {
    // some exports carry a time component: "2020-01-01 00:00:00"
    let date_part = cell.split_whitespace().next().unwrap_or("");
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|_| ParseError::InvalidDate {
        line,
        value: cell.to_string(),
    })
}

/// Parse a precipitation cell. `Ok(None)` marks a missing day.
pub(crate) fn parse_value_cell(cell: &str, line: u64) -> Result<Option<f64>, ParseError> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("null") || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        _ => Err(ParseError::InvalidValue {
            line,
            value: cell.to_string(),
        }),
    }
}

/// Sort by date and drop repeated dates, keeping the last row for each.
pub(crate) fn into_series(mut rows: Vec<Observation>) -> Result<TimeSeries, ParseError> {
    if rows.is_empty() {
        return Err(ParseError::Empty);
    }
    // stable sort keeps file order among equal dates
    rows.sort_by_key(|o| o.date);
    let mut deduped: Vec<Observation> = Vec::with_capacity(rows.len());
    for obs in rows {
        match deduped.last_mut() {
            Some(last) if last.date == obs.date => {
                warn!(
                    "Duplicate observation for {}: keeping {} mm over {} mm",
                    obs.date, obs.value, last.value
                );
                *last = obs;
            }
            _ => deduped.push(obs),
        }
    }
    Ok(TimeSeries::new(deduped)?)
}
