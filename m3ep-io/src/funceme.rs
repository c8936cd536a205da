//! FUNCEME rain gauge exports.
//!
//! Semicolon-separated with a header naming the gauge record id, the gauge
//! (`posto`), the daily total and the date. Rows are not guaranteed to be
//! in date order.
//!
//! ```text
//! id;posto;chuva;data
//! 1;24;0;2020-01-02
//! 2;24;12.5;2020-01-01
//! ```

use crate::error::ParseError;
use crate::source::{into_series, parse_date_cell, parse_value_cell, SeriesParser};
use log::debug;
use m3ep_core::series::{Observation, TimeSeries};

pub const ID_COLUMN: &str = "id";
pub const GAUGE_COLUMN: &str = "posto";
pub const DATE_COLUMN: &str = "data";

#[derive(Debug, Clone, Copy, Default)]
pub struct FuncemeParser;

/// Positions of the date and precipitation columns in a FUNCEME header.
#[derive(Debug, PartialEq)]
struct Columns {
    date: usize,
    value: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Columns, ParseError> {
        let position = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        for required in [ID_COLUMN, GAUGE_COLUMN] {
            if position(required).is_none() {
                return Err(ParseError::MissingColumn(required.to_string()));
            }
        }
        let date =
            position(DATE_COLUMN).ok_or_else(|| ParseError::MissingColumn(DATE_COLUMN.to_string()))?;
        // the precipitation column is whatever remains once the id, gauge and date are set aside
        let value = headers
            .iter()
            .position(|h| {
                !h.is_empty()
                    && ![ID_COLUMN, GAUGE_COLUMN, DATE_COLUMN]
                        .iter()
                        .any(|known| h.eq_ignore_ascii_case(known))
            })
            .ok_or_else(|| ParseError::MissingColumn("daily precipitation".to_string()))?;
        Ok(Columns { date, value })
    }
}

impl SeriesParser for FuncemeParser {
    fn parse(&self, input: &str) -> Result<TimeSeries, ParseError> {
        let input = input.trim_start_matches('\u{feff}');
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input.as_bytes());

        let columns = Columns::locate(rdr.headers()?)?;

        let mut rows = Vec::new();
        let mut missing = 0usize;
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            let date = parse_date_cell(record.get(columns.date).unwrap_or(""), line)?;
            match parse_value_cell(record.get(columns.value).unwrap_or(""), line)? {
                Some(value) => rows.push(Observation::new(date, value)),
                None => missing += 1,
            }
        }
        debug!(
            "funceme: parsed {} rows, skipped {} missing values",
            rows.len(),
            missing
        );
        into_series(rows)
    }
}
