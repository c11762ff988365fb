//! Promotion of stale entries to the next tier.
//!
//! Rollover runs whenever a view of a tier is opened. It checks two
//! boundaries, in order:
//!
//! 1. **Today**: readings whose UTC day is not today are grouped by day,
//!    averaged, and upserted into the history tier. The today tier keeps
//!    only today's readings.
//! 2. **This month**: daily aggregates from any other month are grouped by
//!    month, averaged, and upserted into the monthly tier. The history tier
//!    keeps only the current month.
//!
//! Promotion is a move. With nothing stale, a boundary performs no writes,
//! so running rollover repeatedly is safe. A full run reads the clock once,
//! so both boundaries agree on the current day.
//!
//! Coarser tiers are written back sorted by key, newest first.

use std::cmp::Reverse;

use serde::Serialize;
use tracing::{debug, info};

use gasmon_store::KeyValueStore;
use gasmon_types::{DailyAggregate, DayKey, Keyed, MonthKey, MonthlyAggregate, Reading};

use crate::aggregate::{aggregate_daily, aggregate_monthly, group_by};
use crate::clock::Clock;
use crate::error::Result;
use crate::tier::{Tier, TierStore, upsert};

/// What one boundary moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Archived<K> {
    /// Number of source entries removed from the finer tier.
    pub entries: usize,
    /// Keys written to the coarser tier, oldest first.
    pub keys: Vec<K>,
}

impl<K> Default for Archived<K> {
    fn default() -> Self {
        Self {
            entries: 0,
            keys: Vec::new(),
        }
    }
}

impl<K> Archived<K> {
    /// `true` when nothing moved.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}

/// Outcome of a full rollover run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RolloverReport {
    /// Readings folded into daily aggregates.
    pub today: Archived<DayKey>,
    /// Daily aggregates folded into monthly aggregates.
    pub month: Archived<MonthKey>,
}

impl RolloverReport {
    /// `true` when neither boundary moved anything.
    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.month.is_empty()
    }

    /// Total source entries archived by both boundaries.
    pub fn archived_entries(&self) -> usize {
        self.today.entries + self.month.entries
    }

    /// User-facing notice, or `None` when nothing was archived.
    pub fn notice(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.today.is_empty() {
            parts.push(format!(
                "Archived {} entries from previous days",
                self.today.entries
            ));
        }
        if !self.month.is_empty() {
            parts.push(format!(
                "Archived {} entries from previous months",
                self.month.entries
            ));
        }
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

/// Result of a manual "save average".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Aggregates were written and the source tier was cleared.
    Saved {
        /// Number of aggregates written.
        aggregates: usize,
        /// Number of source entries consumed.
        entries: usize,
    },
    /// The source tier was empty; nothing was touched.
    NothingToSave,
}

/// Runs the today and this-month boundaries against a store.
#[derive(Debug)]
pub struct RolloverManager<S, C> {
    tiers: TierStore<S>,
    clock: C,
}

impl<S: KeyValueStore, C: Clock> RolloverManager<S, C> {
    /// Create a manager over `store`, using `clock` to find the current bucket.
    pub fn new(store: S, clock: C) -> Self {
        Self {
            tiers: TierStore::new(store),
            clock,
        }
    }

    /// Typed access to the tiers this manager writes.
    pub fn tiers(&self) -> &TierStore<S> {
        &self.tiers
    }

    /// Run the today boundary, then the this-month boundary.
    pub fn run(&self) -> Result<RolloverReport> {
        let day = self.clock.today();
        let today = self.roll_today_at(day)?;
        let month = self.roll_month_at(day.month())?;
        let report = RolloverReport { today, month };
        if let Some(notice) = report.notice() {
            debug!("{}", notice);
        }
        Ok(report)
    }

    /// Fold readings from past days into the history tier.
    pub fn roll_today(&self) -> Result<Archived<DayKey>> {
        self.roll_today_at(self.clock.today())
    }

    /// Fold daily aggregates from past months into the monthly tier.
    pub fn roll_month(&self) -> Result<Archived<MonthKey>> {
        self.roll_month_at(self.clock.today().month())
    }

    fn roll_today_at(&self, today: DayKey) -> Result<Archived<DayKey>> {
        let (current, stale): (Vec<Reading>, Vec<Reading>) = self
            .tiers
            .readings()?
            .into_iter()
            .partition(|r| r.day() == today);

        if stale.is_empty() {
            debug!("No readings outside {}", today);
            return Ok(Archived::default());
        }

        let entries = stale.len();
        let aggregates = group_by(stale, Reading::day)
            .into_iter()
            .filter_map(|(day, group)| aggregate_daily(day, &group));
        let keys = self.fold_into::<DailyAggregate>(aggregates)?;
        self.tiers.save(&current)?;

        debug!(
            "Rolled {} readings into {} days, {} readings remain",
            entries,
            keys.len(),
            current.len()
        );
        Ok(Archived { entries, keys })
    }

    fn roll_month_at(&self, this_month: MonthKey) -> Result<Archived<MonthKey>> {
        let (current, stale): (Vec<DailyAggregate>, Vec<DailyAggregate>) = self
            .tiers
            .history()?
            .into_iter()
            .partition(|d| d.date.month() == this_month);

        if stale.is_empty() {
            debug!("No daily aggregates outside {}", this_month);
            return Ok(Archived::default());
        }

        let entries = stale.len();
        let aggregates = group_by(stale, |d| d.date.month())
            .into_iter()
            .filter_map(|(month, group)| aggregate_monthly(month, &group));
        let keys = self.fold_into::<MonthlyAggregate>(aggregates)?;
        self.tiers.save(&current)?;

        debug!(
            "Rolled {} days into {} months, {} days remain",
            entries,
            keys.len(),
            current.len()
        );
        Ok(Archived { entries, keys })
    }

    /// Average every reading in the today tier into the history tier.
    ///
    /// Readings are grouped by their own day. The today tier is cleared
    /// only after at least one aggregate has been written.
    pub fn save_daily_average(&self) -> Result<SaveOutcome> {
        let readings = self.tiers.readings()?;
        let entries = readings.len();
        let aggregates = group_by(readings, Reading::day)
            .into_iter()
            .filter_map(|(day, group)| aggregate_daily(day, &group));
        let written = self.fold_into::<DailyAggregate>(aggregates)?;
        self.finish_save(Tier::Today, entries, written.len())
    }

    /// Average every daily aggregate in the history tier into the monthly tier.
    ///
    /// The history tier is cleared only after at least one aggregate has
    /// been written.
    pub fn save_monthly_average(&self) -> Result<SaveOutcome> {
        let days = self.tiers.history()?;
        let entries = days.len();
        let aggregates = group_by(days, |d| d.date.month())
            .into_iter()
            .filter_map(|(month, group)| aggregate_monthly(month, &group));
        let written = self.fold_into::<MonthlyAggregate>(aggregates)?;
        self.finish_save(Tier::History, entries, written.len())
    }

    fn finish_save(&self, source: Tier, entries: usize, aggregates: usize) -> Result<SaveOutcome> {
        if aggregates == 0 {
            debug!("Nothing to save from the {} tier", source);
            return Ok(SaveOutcome::NothingToSave);
        }
        self.tiers.clear(source)?;
        info!(
            "Saved {} aggregates from {} {} entries",
            aggregates, entries, source
        );
        Ok(SaveOutcome::Saved {
            aggregates,
            entries,
        })
    }

    /// Upsert aggregates into their tier and return the keys written.
    ///
    /// The tier is saved newest first. The destination is written before
    /// the caller trims the source.
    fn fold_into<T>(&self, aggregates: impl Iterator<Item = T>) -> Result<Vec<T::Key>>
    where
        T: Keyed + crate::tier::TierEntry,
    {
        let aggregates: Vec<T> = aggregates.collect();
        if aggregates.is_empty() {
            return Ok(Vec::new());
        }

        let mut resident = self.tiers.load::<T>()?;
        let keys = aggregates.iter().map(Keyed::key).collect();
        for aggregate in aggregates {
            upsert(&mut resident, aggregate);
        }
        resident.sort_by_key(|entry| Reverse(entry.key()));
        self.tiers.save(&resident)?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use gasmon_store::MemoryStore;
    use gasmon_types::Pollutant;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use time::OffsetDateTime;
    use time::macros::datetime;

    /// Hands out the queued instants in order, then repeats the last one.
    struct TickingClock {
        instants: Mutex<VecDeque<OffsetDateTime>>,
    }

    impl TickingClock {
        fn new(instants: impl IntoIterator<Item = OffsetDateTime>) -> Self {
            Self {
                instants: Mutex::new(instants.into_iter().collect()),
            }
        }
    }

    impl Clock for TickingClock {
        fn now(&self) -> OffsetDateTime {
            let mut instants = self.instants.lock().unwrap();
            if instants.len() > 1 {
                instants.pop_front().unwrap()
            } else {
                *instants.front().unwrap()
            }
        }
    }

    fn reading(at: OffsetDateTime, co2: f64) -> Reading {
        Reading::new(at).with(Pollutant::Co2, co2)
    }

    fn daily(day: &str, co: f64) -> DailyAggregate {
        DailyAggregate {
            date: day.parse().unwrap(),
            etanol: Some(0.0),
            co2: Some(0.0),
            co: Some(co),
            nh3: Some(0.0),
        }
    }

    fn manager(
        store: &MemoryStore,
        now: OffsetDateTime,
    ) -> RolloverManager<&MemoryStore, FixedClock> {
        RolloverManager::new(store, FixedClock::new(now))
    }

    // --- today boundary ---

    #[test]
    fn test_roll_today_groups_stale_readings_by_day() {
        let store = MemoryStore::new();
        let mgr = manager(&store, datetime!(2025-01-03 09:00 UTC));
        mgr.tiers()
            .save(&[
                reading(datetime!(2025-01-01 10:00 UTC), 100.0),
                reading(datetime!(2025-01-02 10:00 UTC), 200.0),
                reading(datetime!(2025-01-02 11:00 UTC), 400.0),
                reading(datetime!(2025-01-03 08:00 UTC), 999.0),
            ])
            .unwrap();

        let archived = mgr.roll_today().unwrap();
        assert_eq!(archived.entries, 3);
        assert_eq!(
            archived.keys,
            vec!["2025-01-01".parse().unwrap(), "2025-01-02".parse().unwrap()]
        );

        let history = mgr.tiers().history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].co2, Some(300.0));

        let today = mgr.tiers().readings().unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].co2, Some(999.0));
    }

    #[test]
    fn test_roll_today_replaces_existing_day() {
        let store = MemoryStore::new();
        let mgr = manager(&store, datetime!(2025-01-03 09:00 UTC));
        mgr.tiers().save(&[daily("2025-01-02", 5.0)]).unwrap();
        mgr.tiers()
            .save(&[reading(datetime!(2025-01-02 10:00 UTC), 50.0)])
            .unwrap();

        mgr.roll_today().unwrap();
        let history = mgr.tiers().history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].co2, Some(50.0));
        assert_eq!(history[0].co, Some(0.0));
    }

    #[test]
    fn test_nothing_stale_performs_no_writes() {
        let store = MemoryStore::new();
        let mgr = manager(&store, datetime!(2025-01-03 09:00 UTC));
        mgr.tiers()
            .save(&[reading(datetime!(2025-01-03 08:00 UTC), 1.0)])
            .unwrap();
        mgr.tiers().save(&[daily("2025-01-02", 1.0)]).unwrap();
        let writes = store.write_count();

        let report = mgr.run().unwrap();
        assert!(report.is_empty());
        assert!(report.notice().is_none());
        assert_eq!(store.write_count(), writes);
    }

    // --- month boundary ---

    #[test]
    fn test_roll_month_moves_previous_months() {
        let store = MemoryStore::new();
        let mgr = manager(&store, datetime!(2025-02-01 00:30 UTC));
        mgr.tiers()
            .save(&[
                daily("2024-12-31", 3.0),
                daily("2025-01-10", 10.0),
                daily("2025-01-20", 20.0),
                daily("2025-02-01", 7.0),
            ])
            .unwrap();

        let archived = mgr.roll_month().unwrap();
        assert_eq!(archived.entries, 3);
        assert_eq!(archived.keys.len(), 2);

        let monthly = mgr.tiers().monthly().unwrap();
        let january = monthly
            .iter()
            .find(|m| m.month.to_string() == "2025-01")
            .unwrap();
        assert_eq!(january.co, Some(15.0));
        assert_eq!(january.day_count, 2);

        let history = mgr.tiers().history().unwrap();
        assert_eq!(history, vec![daily("2025-02-01", 7.0)]);
    }

    #[test]
    fn test_run_cascades_today_into_month() {
        let store = MemoryStore::new();
        let mgr = manager(&store, datetime!(2025-02-01 08:00 UTC));
        mgr.tiers()
            .save(&[reading(datetime!(2025-01-31 22:00 UTC), 420.0)])
            .unwrap();

        let report = mgr.run().unwrap();
        assert_eq!(report.today.entries, 1);
        assert_eq!(report.month.entries, 1);
        assert_eq!(report.archived_entries(), 2);
        assert!(mgr.tiers().readings().unwrap().is_empty());
        assert!(mgr.tiers().history().unwrap().is_empty());

        let monthly = mgr.tiers().monthly().unwrap();
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].co2, Some(420.0));
        assert_eq!(monthly[0].day_count, 1);
    }

    #[test]
    fn test_run_reads_the_clock_once() {
        let store = MemoryStore::new();
        let clock = TickingClock::new([
            datetime!(2025-01-31 23:59:59 UTC),
            datetime!(2025-02-01 00:00:01 UTC),
        ]);
        let mgr = RolloverManager::new(&store, &clock);
        mgr.tiers()
            .save(&[reading(datetime!(2025-01-31 12:00 UTC), 100.0)])
            .unwrap();
        mgr.tiers().save(&[daily("2025-01-10", 0.0)]).unwrap();

        // Midnight passes during the first run; both boundaries still see Jan 31.
        let first = mgr.run().unwrap();
        assert!(first.is_empty());
        assert_eq!(mgr.tiers().history().unwrap().len(), 1);
        assert!(mgr.tiers().monthly().unwrap().is_empty());

        let second = mgr.run().unwrap();
        assert_eq!(second.today.entries, 1);
        assert_eq!(second.month.entries, 2);

        let monthly = mgr.tiers().monthly().unwrap();
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].day_count, 2);
        assert_eq!(monthly[0].co2, Some(50.0));
    }

    #[test]
    fn test_rolled_tiers_are_newest_first() {
        let store = MemoryStore::new();
        let mgr = manager(&store, datetime!(2025-04-02 09:00 UTC));
        mgr.tiers()
            .save(&[
                daily("2025-01-05", 1.0),
                daily("2025-02-05", 2.0),
                daily("2025-03-05", 3.0),
            ])
            .unwrap();

        mgr.run().unwrap();
        let months: Vec<String> = mgr
            .tiers()
            .monthly()
            .unwrap()
            .iter()
            .map(|m| m.month.to_string())
            .collect();
        assert_eq!(months, ["2025-03", "2025-02", "2025-01"]);

        mgr.tiers()
            .save(&[
                reading(datetime!(2025-03-30 10:00 UTC), 1.0),
                reading(datetime!(2025-04-01 10:00 UTC), 2.0),
                reading(datetime!(2025-03-31 10:00 UTC), 3.0),
            ])
            .unwrap();
        mgr.roll_today().unwrap();
        let days: Vec<String> = mgr
            .tiers()
            .history()
            .unwrap()
            .iter()
            .map(|d| d.date.to_string())
            .collect();
        assert_eq!(days, ["2025-04-01", "2025-03-31", "2025-03-30"]);
    }

    #[test]
    fn test_run_is_idempotent() {
        let store = MemoryStore::new();
        let mgr = manager(&store, datetime!(2025-01-03 09:00 UTC));
        mgr.tiers()
            .save(&[
                reading(datetime!(2024-12-30 10:00 UTC), 1.0),
                reading(datetime!(2025-01-02 10:00 UTC), 2.0),
                reading(datetime!(2025-01-03 10:00 UTC), 3.0),
            ])
            .unwrap();

        mgr.run().unwrap();
        let snapshot: Vec<_> = Tier::ALL
            .iter()
            .map(|t| store.get(t.store_key()).unwrap())
            .collect();

        let second = mgr.run().unwrap();
        assert!(second.is_empty());
        let again: Vec<_> = Tier::ALL
            .iter()
            .map(|t| store.get(t.store_key()).unwrap())
            .collect();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_notice_text() {
        let report = RolloverReport {
            today: Archived {
                entries: 3,
                keys: vec![],
            },
            month: Archived::default(),
        };
        assert_eq!(
            report.notice().as_deref(),
            Some("Archived 3 entries from previous days")
        );
    }

    // --- manual save ---

    #[test]
    fn test_save_daily_average_clears_today() {
        let store = MemoryStore::new();
        let mgr = manager(&store, datetime!(2025-01-03 09:00 UTC));
        mgr.tiers()
            .save(&[
                reading(datetime!(2025-01-03 08:00 UTC), 10.0),
                reading(datetime!(2025-01-03 08:30 UTC), 30.0),
            ])
            .unwrap();

        let outcome = mgr.save_daily_average().unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::Saved {
                aggregates: 1,
                entries: 2
            }
        );
        assert!(store.get("todays_data").unwrap().is_none());
        assert_eq!(mgr.tiers().history().unwrap()[0].co2, Some(20.0));
    }

    #[test]
    fn test_save_with_empty_source_touches_nothing() {
        let store = MemoryStore::new();
        store.set("todays_data", "[]").unwrap();
        let mgr = manager(&store, datetime!(2025-01-03 09:00 UTC));

        assert_eq!(mgr.save_daily_average().unwrap(), SaveOutcome::NothingToSave);
        assert_eq!(mgr.save_monthly_average().unwrap(), SaveOutcome::NothingToSave);
        assert_eq!(store.get("todays_data").unwrap().as_deref(), Some("[]"));
        assert!(store.get("data_history").unwrap().is_none());
    }

    #[test]
    fn test_save_monthly_average_clears_history() {
        let store = MemoryStore::new();
        let mgr = manager(&store, datetime!(2025-01-20 09:00 UTC));
        mgr.tiers()
            .save(&[daily("2025-01-01", 2.0), daily("2025-01-02", 4.0)])
            .unwrap();

        let outcome = mgr.save_monthly_average().unwrap();
        assert!(matches!(outcome, SaveOutcome::Saved { aggregates: 1, .. }));
        assert!(mgr.tiers().history().unwrap().is_empty());
        assert_eq!(mgr.tiers().monthly().unwrap()[0].co, Some(3.0));
    }

    #[test]
    fn test_storage_failure_leaves_tiers_alone() {
        let store = MemoryStore::new();
        let mgr = manager(&store, datetime!(2025-01-03 09:00 UTC));
        mgr.tiers()
            .save(&[reading(datetime!(2025-01-01 10:00 UTC), 1.0)])
            .unwrap();

        store.set_unavailable(true);
        assert!(mgr.run().is_err());
        store.set_unavailable(false);
        assert_eq!(mgr.tiers().readings().unwrap().len(), 1);
    }
}
