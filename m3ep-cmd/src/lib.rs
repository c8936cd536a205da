//! Command implementations for the M3EP CLI.
//!
//! Provides the `classify` subcommand, which classifies extreme daily
//! precipitation events for a batch of files and exports the results.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use m3ep_core::classify::DEFAULT_QUANTILE;
use m3ep_io::Pattern;
use m3ep_utils::dates::parse_date;
use std::path::PathBuf;

pub mod classify;

#[derive(Subcommand)]
pub enum Command {
    /// Classify extreme daily precipitation events in one or more files
    Classify(ClassifyArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// Precipitation files to classify
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Layout of the input files (funceme or bdmep)
    #[arg(short, long, default_value_t = Pattern::Funceme)]
    pub pattern: Pattern,

    /// Quantile selecting the extreme subset, usually between 0.90 and 0.99
    #[arg(short, long, default_value_t = DEFAULT_QUANTILE)]
    pub quantile: f64,

    /// First day of the period of interest (YYYY-MM-DD, default 1900-01-01)
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last day of the period of interest (YYYY-MM-DD, default today)
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Write the JSON report here; a directory receives the default file name
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write `<file>_events.csv` with each tier's events into this directory
    #[arg(long)]
    pub events_dir: Option<PathBuf>,
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Classify(args) => classify::run_classify(&args),
    }
}
