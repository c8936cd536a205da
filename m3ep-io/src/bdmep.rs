//! INMET BDMEP daily precipitation exports.
//!
//! The file opens with a fixed block of station metadata (name, code,
//! coordinates, period) followed by a semicolon-separated table. Every row
//! ends in `;`, which yields an empty trailing column.
//!
//! ```text
//! Nome: FORTALEZA
//! ...
//! Periodicidade da Medicao: Diaria
//!
//! Data Medicao;PRECIPITACAO TOTAL, DIARIO(mm);
//! 1961-01-01;0;
//! 1961-01-02;12.4;
//! ```

use crate::error::ParseError;
use crate::source::{into_series, parse_date_cell, parse_value_cell, SeriesParser};
use log::debug;
use m3ep_core::series::{Observation, TimeSeries};

/// Number of metadata lines before the table header.
pub const PREAMBLE_LINES: usize = 10;

/// Header of the date column.
pub const DATE_COLUMN: &str = "Data Medicao";

#[derive(Debug, Clone, Copy, Default)]
pub struct BdmepParser;

impl SeriesParser for BdmepParser {
    fn parse(&self, input: &str) -> Result<TimeSeries, ParseError> {
        let table_start = input
            .split_inclusive('\n')
            .take(PREAMBLE_LINES)
            .map(str::len)
            .sum::<usize>();
        let table = &input[table_start..];

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(table.as_bytes());

        let headers = rdr.headers()?.clone();
        if headers.get(0) != Some(DATE_COLUMN) {
            return Err(ParseError::MissingColumn(DATE_COLUMN.to_string()));
        }
        if headers.get(1).map_or(true, str::is_empty) {
            return Err(ParseError::MissingColumn("daily precipitation".to_string()));
        }

        let mut rows = Vec::new();
        let mut missing = 0usize;
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line()) + PREAMBLE_LINES as u64;
            let date_cell = record.get(0).unwrap_or("");
            if date_cell.is_empty() {
                continue;
            }
            let date = parse_date_cell(date_cell, line)?;
            match parse_value_cell(record.get(1).unwrap_or(""), line)? {
                Some(value) => rows.push(Observation::new(date, value)),
                None => missing += 1,
            }
        }
        debug!(
            "bdmep: parsed {} rows, skipped {} missing values",
            rows.len(),
            missing
        );
        into_series(rows)
    }
}
