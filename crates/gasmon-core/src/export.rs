//! Snapshot export of a single tier.
//!
//! JSON snapshots reproduce the resident array verbatim, pretty-printed with
//! two-space indentation, so they can be imported back unchanged. CSV
//! snapshots flatten the same rows for spreadsheets.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use gasmon_store::KeyValueStore;
use gasmon_types::{DailyAggregate, DayKey, MonthlyAggregate, Pollutant, PollutantSample, Reading};
use time::format_description::well_known::Rfc3339;

use crate::tier::{Tier, TierEntry, TierStore};

/// Reasons an export produced nothing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// The tier holds no entries.
    #[error("No {0} data to export")]
    NothingToExport(Tier),

    /// Reading the tier failed.
    #[error(transparent)]
    Store(#[from] crate::Error),

    /// Rendering the snapshot failed.
    #[error("Failed to render snapshot: {0}")]
    Render(String),
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

/// Output encoding of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    /// Pretty-printed JSON array.
    #[default]
    Json,
    /// Comma-separated values with a header row.
    Csv,
}

impl SnapshotFormat {
    /// Filename extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            SnapshotFormat::Json => "json",
            SnapshotFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SnapshotFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(SnapshotFormat::Json),
            "csv" => Ok(SnapshotFormat::Csv),
            other => Err(format!("unknown format '{other}' (expected json or csv)")),
        }
    }
}

/// A rendered tier, ready to be written to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The tier exported.
    pub tier: Tier,
    /// Suggested filename, e.g. `sensor-data-2025-01-02.json`.
    pub filename: String,
    /// The rendered contents.
    pub contents: String,
    /// Number of entries included.
    pub entries: usize,
}

/// Export `tier` as JSON.
///
/// `today` only names the file; the contents are the tier as stored.
pub fn export_tier<S: KeyValueStore>(
    store: S,
    tier: Tier,
    today: DayKey,
) -> Result<Snapshot, ExportError> {
    export_tier_as(store, tier, today, SnapshotFormat::Json)
}

/// Export `tier` in the given format.
pub fn export_tier_as<S: KeyValueStore>(
    store: S,
    tier: Tier,
    today: DayKey,
    format: SnapshotFormat,
) -> Result<Snapshot, ExportError> {
    let tiers = TierStore::new(store);
    let (contents, entries) = match format {
        SnapshotFormat::Json => {
            let values = tiers.load_values(tier)?;
            (serde_json::to_string_pretty(&values)?, values.len())
        }
        SnapshotFormat::Csv => match tier {
            Tier::Today => render_csv::<Reading, _>(&tiers)?,
            Tier::History => render_csv::<DailyAggregate, _>(&tiers)?,
            Tier::Monthly => render_csv::<MonthlyAggregate, _>(&tiers)?,
        },
    };

    if entries == 0 {
        return Err(ExportError::NothingToExport(tier));
    }

    let filename = format!("{}-{}.{}", tier.export_label(), today, format.extension());
    info!("Exported {} {} entries as {}", entries, tier, filename);
    Ok(Snapshot {
        tier,
        filename,
        contents,
        entries,
    })
}

/// A tier entity that renders as one CSV row.
trait CsvRow: TierEntry + PollutantSample {
    /// Leading columns before the pollutant columns.
    const KEY_COLUMNS: &'static [&'static str];
    /// Trailing columns after the pollutant columns.
    const EXTRA_COLUMNS: &'static [&'static str] = &[];

    fn key_fields(&self) -> Vec<String>;

    fn extra_fields(&self) -> Vec<String> {
        Vec::new()
    }

    fn record(&self) -> Vec<String> {
        let mut record = self.key_fields();
        record.extend(
            Pollutant::ALL
                .iter()
                .map(|p| self.available(*p).map(|v| v.to_string()).unwrap_or_default()),
        );
        record.extend(self.extra_fields());
        record
    }
}

impl CsvRow for Reading {
    const KEY_COLUMNS: &'static [&'static str] = &["dateTime", "location"];

    fn key_fields(&self) -> Vec<String> {
        vec![
            self.date_time.format(&Rfc3339).unwrap_or_default(),
            self.location.clone().unwrap_or_default(),
        ]
    }
}

impl CsvRow for DailyAggregate {
    const KEY_COLUMNS: &'static [&'static str] = &["date"];

    fn key_fields(&self) -> Vec<String> {
        vec![self.date.to_string()]
    }
}

impl CsvRow for MonthlyAggregate {
    const KEY_COLUMNS: &'static [&'static str] = &["month"];
    const EXTRA_COLUMNS: &'static [&'static str] = &["dayCount"];

    fn key_fields(&self) -> Vec<String> {
        vec![self.month.to_string()]
    }

    fn extra_fields(&self) -> Vec<String> {
        vec![self.day_count.to_string()]
    }
}

fn render_csv<T: CsvRow, S: KeyValueStore>(
    tiers: &TierStore<S>,
) -> Result<(String, usize), ExportError> {
    let rows = tiers.load::<T>()?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    let header: Vec<&str> = T::KEY_COLUMNS
        .iter()
        .copied()
        .chain(Pollutant::ALL.iter().map(|p| p.key()))
        .chain(T::EXTRA_COLUMNS.iter().copied())
        .collect();
    writer.write_record(&header)?;
    for row in &rows {
        writer.write_record(row.record())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Render(e.to_string()))?;
    let contents = String::from_utf8(bytes).map_err(|e| ExportError::Render(e.to_string()))?;
    Ok((contents, rows.len()))
}
