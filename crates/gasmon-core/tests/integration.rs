//! End-to-end tests for gasmon-core.
//!
//! These drive ingestion, rollover, import and export together against both
//! store implementations with a fixed clock.

use gasmon_core::{
    Collector, ExportError, FixedClock, ImportError, MockTransport, Pollutant, Reading,
    Reconciler, RolloverManager, SnapshotFormat, Tier, TierStore, TodayLog, export_tier,
    export_tier_as,
};
use gasmon_store::{KeyValueStore, MemoryStore, Store};
use time::OffsetDateTime;
use time::macros::datetime;

fn reading(at: OffsetDateTime, etanol: f64, co2: f64, co: f64, nh3: f64) -> Reading {
    Reading::new(at)
        .with(Pollutant::Etanol, etanol)
        .with(Pollutant::Co2, co2)
        .with(Pollutant::Co, co)
        .with(Pollutant::Nh3, nh3)
}

/// Three readings from yesterday and one from today roll into exactly one
/// daily aggregate.
fn yesterday_rolls_into_history<S: KeyValueStore>(store: S) {
    let tiers = TierStore::new(&store);
    tiers
        .save(&[
            reading(datetime!(2025-03-09 08:00 UTC), 10.0, 400.0, 3.0, 1.0),
            reading(datetime!(2025-03-09 12:00 UTC), 20.0, 500.0, 6.0, 2.0),
            reading(datetime!(2025-03-09 20:00 UTC), 30.0, 600.0, 9.0, 6.0),
            reading(datetime!(2025-03-10 07:00 UTC), 99.0, 999.0, 99.0, 99.0),
        ])
        .unwrap();

    let clock = FixedClock::new(datetime!(2025-03-10 09:00 UTC));
    let report = RolloverManager::new(&store, clock).run().unwrap();
    assert_eq!(report.today.entries, 3);
    assert!(report.month.is_empty());

    let today = tiers.readings().unwrap();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].date_time, datetime!(2025-03-10 07:00 UTC));

    let history = tiers.history().unwrap();
    assert_eq!(history.len(), 1);
    let daily = &history[0];
    assert_eq!(daily.date.to_string(), "2025-03-09");
    assert_eq!(daily.etanol, Some(20.0));
    assert_eq!(daily.co2, Some(500.0));
    assert_eq!(daily.co, Some(6.0));
    assert_eq!(daily.nh3, Some(3.0));
}

#[test]
fn test_end_to_end_rollover_memory_store() {
    yesterday_rolls_into_history(MemoryStore::new());
}

#[test]
fn test_end_to_end_rollover_sqlite_store() {
    yesterday_rolls_into_history(Store::open_in_memory().unwrap());
}

#[test]
fn test_rollover_twice_is_a_no_op() {
    let store = MemoryStore::new();
    TierStore::new(&store)
        .save(&[reading(datetime!(2025-02-27 08:00 UTC), 1.0, 2.0, 3.0, 4.0)])
        .unwrap();
    let clock = FixedClock::new(datetime!(2025-03-01 09:00 UTC));
    let manager = RolloverManager::new(&store, &clock);

    let first = manager.run().unwrap();
    assert_eq!(first.archived_entries(), 2);
    let before = store.get("monthly_data").unwrap();

    let second = manager.run().unwrap();
    assert!(second.is_empty());
    assert_eq!(store.get("monthly_data").unwrap(), before);
}

#[test]
fn test_month_end_then_import_then_export() {
    let store = MemoryStore::new();
    let clock = FixedClock::new(datetime!(2025-01-31 23:00 UTC));
    let log = TodayLog::new(&store);
    log.append(reading(datetime!(2025-01-31 22:00 UTC), 5.0, 410.0, 1.0, 0.5))
        .unwrap();

    // Nothing to do until the day changes.
    let manager = RolloverManager::new(&store, &clock);
    assert!(manager.run().unwrap().is_empty());

    clock.set(datetime!(2025-02-01 00:10 UTC));
    let report = manager.run().unwrap();
    assert_eq!(report.today.entries, 1);
    assert_eq!(report.month.entries, 1);

    let imported = Reconciler::new(&store)
        .import_monthly(r#"[{"month":"2024-12","co2":420,"dayCount":31},{"month":"2025-01","co2":1}]"#)
        .unwrap();
    assert_eq!(imported.accepted, 2);
    assert_eq!(imported.total, 2);

    let monthly = TierStore::new(&store).monthly().unwrap();
    assert_eq!(monthly[0].month.to_string(), "2025-01");
    assert_eq!(monthly[0].co2, Some(1.0));
    assert_eq!(monthly[1].month.to_string(), "2024-12");

    let snapshot = export_tier(&store, Tier::Monthly, clock_today(&clock)).unwrap();
    assert_eq!(snapshot.filename, "monthly-data-2025-02-01.json");
    assert_eq!(snapshot.entries, 2);

    let csv = export_tier_as(&store, Tier::Monthly, clock_today(&clock), SnapshotFormat::Csv)
        .unwrap();
    assert_eq!(csv.contents.lines().count(), 3);

    assert!(matches!(
        export_tier(&store, Tier::History, clock_today(&clock)),
        Err(ExportError::NothingToExport(Tier::History))
    ));
}

fn clock_today(clock: &FixedClock) -> gasmon_core::DayKey {
    use gasmon_core::Clock;
    clock.today()
}

#[test]
fn test_export_then_reimport_is_stable() {
    let source = MemoryStore::new();
    Reconciler::new(&source)
        .import_history(
            r#"[{"date":"2025-01-02","etanol":1.5,"co2":400,"co":2,"nh3":0.25},
                {"date":"2025-01-01","etanol":3,"co2":410,"co":4,"nh3":0.5}]"#,
        )
        .unwrap();
    let snapshot = export_tier(&source, Tier::History, "2025-01-03".parse().unwrap()).unwrap();

    let target = MemoryStore::new();
    let reconciler = Reconciler::new(&target);
    reconciler.import_history(&snapshot.contents).unwrap();
    let once = target.get("data_history").unwrap();
    let report = reconciler.import_history(&snapshot.contents).unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(target.get("data_history").unwrap(), once);
    assert_eq!(
        TierStore::new(&target).history().unwrap(),
        TierStore::new(&source).history().unwrap()
    );
}

#[test]
fn test_rejected_import_leaves_tier_untouched() {
    let store = Store::open_in_memory().unwrap();
    store.set("data_history", r#"[{"date":"2025-01-01"}]"#).unwrap();
    let reconciler = Reconciler::new(&store);

    for payload in [r#"{"a":1}"#, "not json", "", r#"[{"date":"soon"}]"#] {
        let err = reconciler.import_history(payload).unwrap_err();
        assert!(!matches!(err, ImportError::Store(_)), "{payload}: {err}");
    }
    assert_eq!(
        store.get("data_history").unwrap().as_deref(),
        Some(r#"[{"date":"2025-01-01"}]"#)
    );
}

#[tokio::test]
async fn test_collector_feeds_rollover() {
    let store = MemoryStore::new();
    let clock = FixedClock::new(datetime!(2025-05-20 10:00 UTC));
    let transport = MockTransport::from_frames([
        "Etanol:25.3ppm,CO2:412.7ppm,CO:15.2ppm,NH3:8.9ppm",
        "Etanol:abc,CO2:400ppm",
    ]);

    let mut collector = Collector::new(transport, TodayLog::new(&store), &clock);
    let stats = collector.run().await;
    assert_eq!(stats.stored, 2);

    clock.set(datetime!(2025-05-21 08:00 UTC));
    let report = RolloverManager::new(&store, &clock).run().unwrap();
    assert_eq!(report.today.entries, 2);

    let history = TierStore::new(&store).history().unwrap();
    let daily = &history[0];
    assert_eq!(daily.date.to_string(), "2025-05-20");
    // The unparseable ethanol value counts as zero in the mean.
    assert!((daily.etanol.unwrap() - 12.65).abs() < 1e-9);
    assert!((daily.co2.unwrap() - 406.35).abs() < 1e-9);
}
