//! Shared utility functions for M3EP crates.

/// Date utility functions
pub mod dates {
    use chrono::{Local, NaiveDate};

    /// ISO calendar date format used on the command line and in exports.
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)?)
    }

    /// Earliest date considered when no start date is given.
    pub fn default_start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(1900, 1, 1).expect("1900-01-01 is a valid date")
    }

    /// Today's date in local time, the default end of a classification period.
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

}
