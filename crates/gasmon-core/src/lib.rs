//! Time-series rollup and reconciliation engine for gasmon sensors.
//!
//! Readings from a gas sensor are kept at three granularities, each stored
//! as one JSON array in a [`KeyValueStore`](gasmon_store::KeyValueStore):
//!
//! | Tier | Store key | Entity | Natural key |
//! |------|-----------|--------|-------------|
//! | today | `todays_data` | [`Reading`] | none (newest 100 kept) |
//! | history | `data_history` | [`DailyAggregate`] | `date` (`YYYY-MM-DD`) |
//! | monthly | `monthly_data` | [`MonthlyAggregate`] | `month` (`YYYY-MM`) |
//!
//! # Features
//!
//! - **Ingestion**: parse text frames from a [`FrameSource`] into the today tier
//! - **Rollover**: fold past days into history and past months into monthly
//! - **Import**: merge snapshots by natural key, last write wins
//! - **Export**: render a tier as pretty JSON or CSV
//! - **Classification**: eco ceilings and gas levels for display
//!
//! # Quick Start
//!
//! ```
//! use gasmon_core::{FixedClock, RolloverManager, TodayLog};
//! use gasmon_store::MemoryStore;
//! use gasmon_types::parse_frame;
//! use time::macros::datetime;
//!
//! let store = MemoryStore::new();
//! let log = TodayLog::new(&store);
//! let yesterday = datetime!(2025-01-01 18:00 UTC);
//! log.append(parse_frame("CO2:412.7ppm,CO:15.2ppm").stamp(yesterday))?;
//!
//! let clock = FixedClock::new(datetime!(2025-01-02 09:00 UTC));
//! let report = RolloverManager::new(&store, clock).run()?;
//! assert_eq!(report.today.entries, 1);
//! # Ok::<(), gasmon_core::Error>(())
//! ```

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod events;
pub mod export;
pub mod ingest;
pub mod mock;
pub mod reconcile;
pub mod rollover;
pub mod thresholds;
pub mod tier;
pub mod traits;
pub mod transport;

// Core exports
pub use aggregate::{ZeroFillForAggregation, aggregate_daily, aggregate_monthly, group_by};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use events::{
    DisconnectReason, EventDispatcher, EventReceiver, EventSender, IngestEvent, TransportEvent,
};
pub use export::{ExportError, Snapshot, SnapshotFormat, export_tier, export_tier_as};
pub use ingest::{Collector, CollectorStats, LinkState, TodayLog};
pub use mock::MockTransport;
pub use reconcile::{
    Decoded, EntryRejection, ImportEntry, ImportError, ImportReport, Reconciler, decode_snapshot,
};
pub use rollover::{Archived, RolloverManager, RolloverReport, SaveOutcome};
pub use thresholds::{EcoThresholds, GasLevel, is_eco};
pub use tier::{Tier, TierEntry, TierStore, upsert};
pub use traits::FrameSource;
pub use transport::{LineSource, event_stream};

// Re-export from gasmon-types
pub use gasmon_types::{
    DailyAggregate, DayKey, MonthKey, MonthlyAggregate, ParsedFrame, Pollutant, PollutantSample,
    Reading, parse_frame,
};
