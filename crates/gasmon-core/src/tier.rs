//! Typed access to the three data tiers.
//!
//! Each tier is one JSON array stored under a fixed key. [`TierStore`] is the
//! only place that knows those keys and their encoding; everything above it
//! works with typed vectors.

use core::fmt;
use core::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use gasmon_store::KeyValueStore;
use gasmon_types::{DailyAggregate, Keyed, MonthlyAggregate, Reading};

use crate::error::{Error, Result};

/// One of the three temporal granularities of resident data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Raw readings received today, newest last.
    Today,
    /// One [`DailyAggregate`] per past day.
    History,
    /// One [`MonthlyAggregate`] per past month.
    Monthly,
}

impl Tier {
    /// Every tier, from finest to coarsest.
    pub const ALL: [Tier; 3] = [Tier::Today, Tier::History, Tier::Monthly];

    /// The key this tier is persisted under.
    pub fn store_key(&self) -> &'static str {
        match self {
            Tier::Today => "todays_data",
            Tier::History => "data_history",
            Tier::Monthly => "monthly_data",
        }
    }

    /// Prefix used for snapshot filenames.
    pub fn export_label(&self) -> &'static str {
        match self {
            Tier::Today => "todays-data",
            Tier::History => "sensor-data",
            Tier::Monthly => "monthly-data",
        }
    }

    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Tier::Today => "today",
            Tier::History => "history",
            Tier::Monthly => "monthly",
        }
    }

    /// The tier this one rolls into, if any.
    pub fn next(&self) -> Option<Tier> {
        match self {
            Tier::Today => Some(Tier::History),
            Tier::History => Some(Tier::Monthly),
            Tier::Monthly => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Tier::ALL
            .into_iter()
            .find(|t| t.name() == lower || t.store_key() == lower)
            .ok_or_else(|| format!("unknown tier '{s}' (expected today, history or monthly)"))
    }
}

/// An entity type that lives in exactly one tier.
pub trait TierEntry: Serialize + DeserializeOwned {
    /// The tier holding entities of this type.
    const TIER: Tier;
}

impl TierEntry for Reading {
    const TIER: Tier = Tier::Today;
}

impl TierEntry for DailyAggregate {
    const TIER: Tier = Tier::History;
}

impl TierEntry for MonthlyAggregate {
    const TIER: Tier = Tier::Monthly;
}

/// Replace the entry with the same key, or append when the key is new.
pub fn upsert<T: Keyed>(entries: &mut Vec<T>, entry: T) {
    let key = entry.key();
    match entries.iter_mut().find(|e| e.key() == key) {
        Some(slot) => *slot = entry,
        None => entries.push(entry),
    }
}

/// Typed load/save/clear of tiers over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct TierStore<S> {
    store: S,
}

impl<S: KeyValueStore> TierStore<S> {
    /// Wrap a key-value store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Load all entries of `T`'s tier. A missing key reads as empty.
    pub fn load<T: TierEntry>(&self) -> Result<Vec<T>> {
        let Some(raw) = self.store.get(T::TIER.store_key())? else {
            return Ok(Vec::new());
        };
        decode(T::TIER, &raw)
    }

    /// Overwrite `T`'s tier with `entries`.
    pub fn save<T: TierEntry>(&self, entries: &[T]) -> Result<()> {
        let json = serde_json::to_string(entries)?;
        self.store.set(T::TIER.store_key(), &json)?;
        debug!("Saved {} entries to the {} tier", entries.len(), T::TIER);
        Ok(())
    }

    /// Load a tier as untyped JSON values, exactly as stored.
    pub fn load_values(&self, tier: Tier) -> Result<Vec<serde_json::Value>> {
        match self.store.get(tier.store_key())? {
            Some(raw) => decode(tier, &raw),
            None => Ok(Vec::new()),
        }
    }

    /// Number of entries in a tier.
    pub fn count(&self, tier: Tier) -> Result<usize> {
        Ok(self.load_values(tier)?.len())
    }

    /// Remove a tier entirely.
    pub fn clear(&self, tier: Tier) -> Result<()> {
        self.store.remove(tier.store_key())?;
        debug!("Cleared the {} tier", tier);
        Ok(())
    }

    /// Today's raw readings.
    pub fn readings(&self) -> Result<Vec<Reading>> {
        self.load()
    }

    /// Daily aggregates.
    pub fn history(&self) -> Result<Vec<DailyAggregate>> {
        self.load()
    }

    /// Monthly aggregates.
    pub fn monthly(&self) -> Result<Vec<MonthlyAggregate>> {
        self.load()
    }
}

fn decode<T: DeserializeOwned>(tier: Tier, raw: &str) -> Result<Vec<T>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    // A stored `null` reads as an empty tier.
    serde_json::from_str::<Option<Vec<T>>>(raw)
        .map(Option::unwrap_or_default)
        .map_err(|e| Error::corrupt(tier, e))
}
