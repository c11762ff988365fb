//! Merging imported snapshots into resident tiers.
//!
//! Import runs in three gates, each of which aborts without touching the
//! resident tier:
//!
//! 1. The text must be non-blank JSON.
//! 2. The JSON must be an array.
//! 3. At least one element must decode into a valid entry. Elements that do
//!    not are dropped and counted in [`ImportReport::rejected`].
//!
//! Valid entries are then overlaid onto the resident tier by natural key,
//! last write wins, and the tier is persisted sorted by key descending.
//! Importing the same snapshot twice leaves the tier unchanged.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use gasmon_store::KeyValueStore;
use gasmon_types::{DailyAggregate, DayKey, Keyed, MonthKey, MonthlyAggregate, Pollutant};

use crate::tier::{Tier, TierEntry, TierStore};

/// Reasons an import is refused as a whole.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    /// Nothing was supplied.
    #[error("Please enter JSON data")]
    EmptyInput,

    /// The text is not JSON.
    #[error("Invalid JSON data: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The JSON is not an array.
    #[error("Imported data must be an array")]
    NotAnArray,

    /// Every element was rejected.
    #[error("No valid {} entries found", entry_noun(.tier))]
    NoValidEntries {
        /// The tier being imported into.
        tier: Tier,
        /// Number of elements rejected.
        rejected: usize,
    },

    /// The tier has no natural key to merge on.
    #[error("The {0} tier cannot be imported")]
    UnsupportedTier(Tier),

    /// Reading or writing the resident tier failed.
    #[error(transparent)]
    Store(#[from] crate::Error),
}

fn entry_noun(tier: &Tier) -> &'static str {
    match tier {
        Tier::Monthly => "monthly",
        _ => "data",
    }
}

/// Why a single snapshot element was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryRejection {
    /// The element is not a JSON object.
    NotAnObject,
    /// The object lacks its key field.
    MissingKey(&'static str),
    /// The key field is present but does not parse.
    InvalidKey(String),
}

impl fmt::Display for EntryRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "entry is not an object"),
            Self::MissingKey(field) => write!(f, "entry has no '{}' field", field),
            Self::InvalidKey(key) => write!(f, "invalid key '{}'", key),
        }
    }
}

/// One snapshot element after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// A well-formed entry.
    Valid(T),
    /// A dropped element and the reason.
    Rejected(EntryRejection),
}

impl<T> Decoded<T> {
    /// The entry, if valid.
    pub fn valid(self) -> Option<T> {
        match self {
            Decoded::Valid(entry) => Some(entry),
            Decoded::Rejected(_) => None,
        }
    }
}

/// An entity that can be decoded from an untyped snapshot element.
pub trait ImportEntry: Keyed + TierEntry + Sized {
    /// Name of the field holding the natural key.
    const KEY_FIELD: &'static str;

    /// Decode one element.
    fn decode(value: &Value) -> Decoded<Self> {
        let Some(object) = value.as_object() else {
            return Decoded::Rejected(EntryRejection::NotAnObject);
        };
        let Some(raw_key) = object.get(Self::KEY_FIELD) else {
            return Decoded::Rejected(EntryRejection::MissingKey(Self::KEY_FIELD));
        };
        let Some(key) = raw_key.as_str().and_then(Self::parse_key) else {
            let shown = raw_key
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| raw_key.to_string());
            return Decoded::Rejected(EntryRejection::InvalidKey(shown));
        };
        Decoded::Valid(Self::from_fields(key, object))
    }

    /// Parse the key field; `None` when it is not a valid key.
    fn parse_key(raw: &str) -> Option<Self::Key>;

    /// Build the entity from a parsed key and the remaining fields.
    fn from_fields(key: Self::Key, object: &Map<String, Value>) -> Self;
}

/// A numeric field, or `None` when absent or not a number.
fn number(object: &Map<String, Value>, pollutant: Pollutant) -> Option<f64> {
    object.get(pollutant.key()).and_then(Value::as_f64)
}

impl ImportEntry for DailyAggregate {
    const KEY_FIELD: &'static str = "date";

    fn parse_key(raw: &str) -> Option<DayKey> {
        DayKey::parse_lenient(raw).ok()
    }

    fn from_fields(date: DayKey, object: &Map<String, Value>) -> Self {
        DailyAggregate {
            date,
            etanol: number(object, Pollutant::Etanol),
            co2: number(object, Pollutant::Co2),
            co: number(object, Pollutant::Co),
            nh3: number(object, Pollutant::Nh3),
        }
    }
}

impl ImportEntry for MonthlyAggregate {
    const KEY_FIELD: &'static str = "month";

    fn parse_key(raw: &str) -> Option<MonthKey> {
        raw.parse().ok()
    }

    fn from_fields(month: MonthKey, object: &Map<String, Value>) -> Self {
        MonthlyAggregate {
            month,
            etanol: number(object, Pollutant::Etanol),
            co2: number(object, Pollutant::Co2),
            co: number(object, Pollutant::Co),
            nh3: number(object, Pollutant::Nh3),
            day_count: object
                .get("dayCount")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
        }
    }
}

/// Outcome of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ImportReport {
    /// The tier imported into.
    pub tier: Tier,
    /// Valid elements merged.
    pub accepted: usize,
    /// Elements dropped during decoding.
    pub rejected: usize,
    /// Tier size after the merge.
    pub total: usize,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully imported {} entries. Total entries: {}",
            self.accepted, self.total
        )
    }
}

/// Decode snapshot text into typed elements.
pub fn decode_snapshot<T: ImportEntry>(text: &str) -> Result<Vec<Decoded<T>>, ImportError> {
    if text.trim().is_empty() {
        return Err(ImportError::EmptyInput);
    }
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(elements) = value else {
        return Err(ImportError::NotAnArray);
    };
    Ok(elements.iter().map(T::decode).collect())
}

/// Merges snapshots into the history and monthly tiers.
#[derive(Debug)]
pub struct Reconciler<S> {
    tiers: TierStore<S>,
}

impl<S: KeyValueStore> Reconciler<S> {
    /// Create a reconciler over `store`.
    pub fn new(store: S) -> Self {
        Self {
            tiers: TierStore::new(store),
        }
    }

    /// Import into the tier named by `tier`.
    pub fn import(&self, tier: Tier, text: &str) -> Result<ImportReport, ImportError> {
        match tier {
            Tier::History => self.import_history(text),
            Tier::Monthly => self.import_monthly(text),
            Tier::Today => Err(ImportError::UnsupportedTier(tier)),
        }
    }

    /// Import daily aggregates.
    pub fn import_history(&self, text: &str) -> Result<ImportReport, ImportError> {
        self.merge::<DailyAggregate>(text)
    }

    /// Import monthly aggregates.
    pub fn import_monthly(&self, text: &str) -> Result<ImportReport, ImportError> {
        self.merge::<MonthlyAggregate>(text)
    }

    fn merge<T: ImportEntry>(&self, text: &str) -> Result<ImportReport, ImportError> {
        let decoded = decode_snapshot::<T>(text)?;
        let submitted = decoded.len();

        let mut imported = Vec::with_capacity(submitted);
        for (index, entry) in decoded.into_iter().enumerate() {
            match entry {
                Decoded::Valid(entry) => imported.push(entry),
                Decoded::Rejected(reason) => debug!("Dropping element {}: {}", index, reason),
            }
        }
        let accepted = imported.len();
        let rejected = submitted - accepted;
        if accepted == 0 {
            return Err(ImportError::NoValidEntries {
                tier: T::TIER,
                rejected,
            });
        }

        let mut merged: BTreeMap<T::Key, T> = BTreeMap::new();
        for entry in self.tiers.load::<T>()?.into_iter().chain(imported) {
            merged.insert(entry.key(), entry);
        }
        let entries: Vec<T> = merged.into_values().rev().collect();
        self.tiers.save(&entries)?;

        let report = ImportReport {
            tier: T::TIER,
            accepted,
            rejected,
            total: entries.len(),
        };
        info!(
            "Imported {} {} entries ({} rejected), {} total",
            accepted, report.tier, rejected, report.total
        );
        Ok(report)
    }
}
