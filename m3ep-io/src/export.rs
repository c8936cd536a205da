//! Result exports: the JSON batch report and per-tier event subset CSVs.

use chrono::NaiveDate;
use m3ep_core::classify::{ClassificationResult, REPORT_DECIMALS};
use m3ep_core::series::TimeSeries;
use m3ep_utils::dates::format_date;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Reported threshold and event count of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierExport {
    #[serde(serialize_with = "serialize_threshold")]
    pub threshold: f64,
    pub event_count: usize,
}

/// All three tiers of one classified file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FileExport {
    pub moderate: TierExport,
    pub strong: TierExport,
    pub very_strong: TierExport,
}

impl From<&ClassificationResult> for FileExport {
    fn from(result: &ClassificationResult) -> Self {
        let [moderate, strong, very_strong] = result.tiers.map(|t| TierExport {
            threshold: t.threshold(),
            event_count: t.event_count,
        });
        FileExport {
            moderate,
            strong,
            very_strong,
        }
    }
}

fn serialize_threshold<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{:.*}", REPORT_DECIMALS as usize, value))
}

/// Batch results keyed by file identifier, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExportReport {
    files: BTreeMap<String, FileExport>,
}

impl ExportReport {
    pub fn insert(&mut self, identifier: impl Into<String>, result: &ClassificationResult) {
        self.files.insert(identifier.into(), result.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_json<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }
}

/// File name without directory or extension, used to key exports.
pub fn file_identifier(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Export file name for a classification period.
pub fn default_export_file_name(start: &NaiveDate, end: &NaiveDate) -> String {
    format!(
        "m3ep_results_{}-{}.json",
        format_date(start),
        format_date(end)
    )
}

/// One row of an event subset CSV.
#[derive(Debug, Serialize)]
struct EventRow<'a> {
    tier: &'a str,
    date: String,
    value: f64,
}

/// Write every tier's event subset as `tier,date,value` rows.
pub fn write_event_subsets<W: Write>(
    writer: W,
    result: &ClassificationResult,
    series: &TimeSeries,
) -> Result<usize, csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut rows = 0usize;
    for subset in result.event_subsets(series) {
        for obs in &subset.observations {
            wtr.serialize(EventRow {
                tier: subset.tier.key(),
                date: format_date(&obs.date),
                value: obs.value,
            })?;
            rows += 1;
        }
    }
    wtr.flush()?;
    Ok(rows)
}
