//! Batch classification of precipitation files.
//!
//! Every file is parsed and classified on its own. A file that fails is
//! logged and reported alongside the results, and the remaining files are
//! still processed.

use crate::ClassifyArgs;
use anyhow::Context;
use log::{error, info, warn};
use m3ep_core::classify::{classify_in_range, validate_quantile, ClassificationResult};
use m3ep_core::date_range::DateRange;
use m3ep_core::series::TimeSeries;
use m3ep_core::tier::Tier;
use m3ep_io::export::{
    default_export_file_name, file_identifier, write_event_subsets, ExportReport,
};
use m3ep_io::{read_series, Pattern};
use m3ep_utils::dates::{default_start_date, today};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// A file that was parsed and classified.
#[derive(Debug)]
pub struct ClassifiedFile {
    pub identifier: String,
    pub series: TimeSeries,
    pub result: ClassificationResult,
}

/// A file that could not be parsed or classified.
#[derive(Debug)]
pub struct FileFailure {
    pub identifier: String,
    pub error: anyhow::Error,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub classified: Vec<ClassifiedFile>,
    pub failures: Vec<FileFailure>,
}

impl BatchOutcome {
    pub fn report(&self) -> ExportReport {
        let mut report = ExportReport::default();
        for file in &self.classified {
            report.insert(file.identifier.clone(), &file.result);
        }
        report
    }
}

/// Parse and classify one file.
pub fn classify_file(
    path: &Path,
    pattern: Pattern,
    quantile: f64,
    range: &DateRange,
) -> anyhow::Result<(TimeSeries, ClassificationResult)> {
    let series = read_series(path, pattern)
        .with_context(|| format!("failed to parse {} as {}", path.display(), pattern))?;
    let result = classify_in_range(&series, quantile, range)
        .with_context(|| format!("failed to classify {}", path.display()))?;
    Ok((series, result))
}

/// Classify each file independently, collecting successes and failures.
pub fn classify_files(
    files: &[PathBuf],
    pattern: Pattern,
    quantile: f64,
    range: &DateRange,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for path in files {
        let identifier = file_identifier(path);
        match classify_file(path, pattern, quantile, range) {
            Ok((series, result)) => {
                info!(
                    "{}: {} wet days, limiar {:.2} mm, {} extreme events",
                    identifier,
                    result.positive_count,
                    result.quantile_threshold,
                    result.total_events()
                );
                outcome.classified.push(ClassifiedFile {
                    identifier,
                    series,
                    result,
                });
            }
            Err(err) => {
                error!("{}: {:#}", identifier, err);
                outcome.failures.push(FileFailure {
                    identifier,
                    error: err,
                });
            }
        }
    }
    outcome
}

/// Human-readable results table.
pub fn render_table(outcome: &BatchOutcome) -> String {
    let mut out = String::new();
    for file in &outcome.classified {
        let result = &file.result;
        out.push_str(&format!(
            "{} (quantile {}, limiar {:.2} mm, {} wet days)\n",
            file.identifier, result.quantile, result.quantile_threshold, result.positive_count
        ));
        for tier in Tier::ALL {
            let summary = result.tier(tier);
            out.push_str(&format!(
                "  {:<12} {:>8.2} mm {:>6} events\n",
                tier.to_string(),
                summary.threshold(),
                summary.event_count
            ));
        }
    }
    for failure in &outcome.failures {
        out.push_str(&format!(
            "{}: FAILED: {:#}\n",
            failure.identifier, failure.error
        ));
    }
    out
}

/// Where the JSON report goes: `output` itself, or the default name inside it.
pub fn resolve_output_path(output: &Path, range: &DateRange) -> PathBuf {
    if output.is_dir() {
        output.join(default_export_file_name(&range.start(), &range.end()))
    } else {
        output.to_path_buf()
    }
}

fn write_report(report: &ExportReport, path: &Path) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    report
        .write_json(BufWriter::new(file))
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote results for {} files to {}", report.len(), path.display());
    Ok(())
}

fn write_events(classified: &[ClassifiedFile], dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    for file in classified {
        let path = dir.join(format!("{}_events.csv", file.identifier));
        let out =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        let rows = write_event_subsets(BufWriter::new(out), &file.result, &file.series)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote {} events to {}", rows, path.display());
    }
    Ok(())
}

fn log_batch_summary(outcome: &BatchOutcome) {
    let total = outcome.classified.len() + outcome.failures.len();
    let message = format!(
        "Classification complete: {}/{} successful, {} failed",
        outcome.classified.len(),
        total,
        outcome.failures.len()
    );
    if outcome.failures.is_empty() {
        info!("{}", message);
    } else if outcome.classified.is_empty() {
        error!("{}", message);
    } else {
        warn!("{}", message);
    }
}

/// Run the `classify` subcommand.
pub fn run_classify(args: &ClassifyArgs) -> anyhow::Result<()> {
    let quantile = validate_quantile(args.quantile)?;
    let range = DateRange(
        args.start.unwrap_or_else(default_start_date),
        args.end.unwrap_or_else(today),
    );
    if range.is_empty() {
        warn!(
            "Start date {} is after end date {}; no observations will be selected",
            range.start(),
            range.end()
        );
    }

    info!(
        "Classifying {} files ({} layout) at quantile {} from {} to {}",
        args.files.len(),
        args.pattern,
        quantile,
        range.start(),
        range.end()
    );

    let outcome = classify_files(&args.files, args.pattern, quantile, &range);
    print!("{}", render_table(&outcome));

    if let Some(output) = &args.output {
        let path = resolve_output_path(output, &range);
        write_report(&outcome.report(), &path)?;
    }
    if let Some(dir) = &args.events_dir {
        write_events(&outcome.classified, dir)?;
    }

    log_batch_summary(&outcome);
    if outcome.classified.is_empty() {
        anyhow::bail!(
            "no file could be classified ({} failed)",
            outcome.failures.len()
        );
    }
    Ok(())
}
