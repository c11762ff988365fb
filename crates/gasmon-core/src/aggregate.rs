//! Daily and monthly averaging.
//!
//! Both aggregators take the bucket key from the caller instead of deriving
//! it from the entries, so a mixed group cannot silently produce an
//! aggregate keyed by whichever entry happened to come first.

use std::collections::BTreeMap;

use tracing::debug;

use gasmon_types::{
    DailyAggregate, DayKey, MonthKey, MonthlyAggregate, Pollutant, PollutantSample, Reading,
};

/// How missing values take part in averaging.
///
/// An absent or non-finite pollutant value contributes `0` to the sum, and
/// the sum is divided by the total number of entries rather than by the
/// number of entries that carried the value. Display code still reports
/// such values as unavailable; only the averages see them as zero.
///
/// This skews averages low whenever a sensor drops a field. The behaviour is
/// kept because stored history was computed this way.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroFillForAggregation;

impl ZeroFillForAggregation {
    /// The amount one value adds to a sum.
    pub fn contribution(value: Option<f64>) -> f64 {
        value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    /// Mean of one pollutant across `entries`; `None` when `entries` is empty.
    pub fn mean<S: PollutantSample>(entries: &[S], pollutant: Pollutant) -> Option<f64> {
        if entries.is_empty() {
            return None;
        }
        let sum: f64 = entries
            .iter()
            .map(|e| Self::contribution(e.value(pollutant)))
            .sum();
        Some(sum / entries.len() as f64)
    }
}

/// Average the readings of one day.
///
/// Returns `None` for an empty slice. The caller is responsible for passing
/// only readings from `day`.
///
/// # Example
///
/// ```
/// use gasmon_core::aggregate_daily;
/// use gasmon_types::{Pollutant, Reading};
/// use time::macros::datetime;
///
/// let at = datetime!(2025-01-02 08:00 UTC);
/// let readings = [
///     Reading::new(at).with(Pollutant::Etanol, 10.0),
///     Reading::new(at).with(Pollutant::Etanol, 20.0),
/// ];
/// let daily = aggregate_daily(readings[0].day(), &readings).unwrap();
/// assert_eq!(daily.etanol, Some(15.0));
/// assert_eq!(daily.co, Some(0.0));
/// ```
pub fn aggregate_daily(day: DayKey, readings: &[Reading]) -> Option<DailyAggregate> {
    if readings.is_empty() {
        return None;
    }
    debug!("Averaging {} readings for {}", readings.len(), day);
    let mean = |p| ZeroFillForAggregation::mean(readings, p);
    Some(DailyAggregate {
        date: day,
        etanol: mean(Pollutant::Etanol),
        co2: mean(Pollutant::Co2),
        co: mean(Pollutant::Co),
        nh3: mean(Pollutant::Nh3),
    })
}

/// Average the daily aggregates of one month.
///
/// Returns `None` for an empty slice; otherwise `day_count` is the slice length.
pub fn aggregate_monthly(month: MonthKey, days: &[DailyAggregate]) -> Option<MonthlyAggregate> {
    if days.is_empty() {
        return None;
    }
    debug!("Averaging {} days for {}", days.len(), month);
    let mean = |p| ZeroFillForAggregation::mean(days, p);
    Some(MonthlyAggregate {
        month,
        etanol: mean(Pollutant::Etanol),
        co2: mean(Pollutant::Co2),
        co: mean(Pollutant::Co),
        nh3: mean(Pollutant::Nh3),
        day_count: u32::try_from(days.len()).unwrap_or(u32::MAX),
    })
}

/// Partition items into ordered buckets, keeping input order within each.
pub fn group_by<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> BTreeMap<K, Vec<T>>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}
