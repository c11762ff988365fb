//! Ingestion of live frames into the today tier.

use core::fmt;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use gasmon_store::KeyValueStore;
use gasmon_types::{Reading, TODAY_CAPACITY, parse_frame};

use crate::clock::Clock;
use crate::error::Result;
use crate::events::{EventDispatcher, EventReceiver, IngestEvent, TransportEvent};
use crate::tier::TierStore;
use crate::traits::FrameSource;

/// Append-only view of the today tier, capped to the newest readings.
#[derive(Debug)]
pub struct TodayLog<S> {
    tiers: TierStore<S>,
    cap: usize,
}

impl<S: KeyValueStore> TodayLog<S> {
    /// A log keeping the newest [`TODAY_CAPACITY`] readings.
    pub fn new(store: S) -> Self {
        Self::with_capacity(store, TODAY_CAPACITY)
    }

    /// A log keeping the newest `cap` readings (at least one).
    pub fn with_capacity(store: S, cap: usize) -> Self {
        Self {
            tiers: TierStore::new(store),
            cap: cap.max(1),
        }
    }

    /// The configured cap.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Append a reading, dropping the oldest beyond the cap. Returns the
    /// new number of readings.
    pub fn append(&self, reading: Reading) -> Result<usize> {
        let mut readings = self.tiers.readings()?;
        readings.push(reading);
        if readings.len() > self.cap {
            let excess = readings.len() - self.cap;
            readings.drain(..excess);
            debug!("Dropped {} oldest readings", excess);
        }
        self.tiers.save(&readings)?;
        Ok(readings.len())
    }
}

/// Connection state as last reported by the transport.
///
/// A failure is sticky: it persists through a subsequent disconnect and is
/// only cleared by the next `Connected`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LinkState {
    /// No link.
    #[default]
    Disconnected,
    /// Link is up.
    Connected,
    /// The link reported an error.
    Failed(String),
}

impl LinkState {
    /// `true` while the link is up.
    pub fn is_connected(&self) -> bool {
        matches!(self, LinkState::Connected)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Disconnected => write!(f, "disconnected"),
            LinkState::Connected => write!(f, "connected"),
            LinkState::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

/// Counters kept by a [`Collector`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectorStats {
    /// Frames received.
    pub frames: u64,
    /// Readings persisted.
    pub stored: u64,
    /// Frames without any recognized key.
    pub skipped: u64,
    /// Readings lost to storage failures.
    pub store_failures: u64,
}

/// Drives a [`FrameSource`] into a [`TodayLog`].
///
/// Storage failures are logged and counted; they never stop the collector.
pub struct Collector<T, S, C> {
    source: T,
    log: TodayLog<S>,
    clock: C,
    state: LinkState,
    stats: CollectorStats,
    events: EventDispatcher,
}

impl<T, S, C> fmt::Debug for Collector<T, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<T: FrameSource, S: KeyValueStore, C: Clock> Collector<T, S, C> {
    /// Create a collector reading from `source` into `log`.
    pub fn new(source: T, log: TodayLog<S>, clock: C) -> Self {
        Self {
            source,
            log,
            clock,
            state: LinkState::default(),
            stats: CollectorStats::default(),
            events: EventDispatcher::default(),
        }
    }

    /// Subscribe to ingestion events.
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Current link state.
    pub fn state(&self) -> &LinkState {
        &self.state
    }

    /// Counters so far.
    pub fn stats(&self) -> CollectorStats {
        self.stats
    }

    /// Process one transport event. Returns `false` once the source is exhausted.
    pub async fn step(&mut self) -> bool {
        match self.source.next_event().await {
            Some(event) => {
                self.handle(event);
                true
            }
            None => false,
        }
    }

    /// Consume the source until it is exhausted.
    pub async fn run(&mut self) -> CollectorStats {
        info!("Collecting frames from {}", self.source.describe());
        while self.step().await {}
        info!(
            "Collector finished: {} frames, {} stored, {} skipped, {} lost",
            self.stats.frames, self.stats.stored, self.stats.skipped, self.stats.store_failures
        );
        self.stats
    }

    /// Apply one event.
    pub fn handle(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                info!("Sensor link connected");
                self.set_state(LinkState::Connected);
            }
            TransportEvent::Disconnected { reason } => {
                info!("Sensor link disconnected: {:?}", reason);
                if !matches!(self.state, LinkState::Failed(_)) {
                    self.set_state(LinkState::Disconnected);
                }
            }
            TransportEvent::Error { message } => {
                error!("Sensor link error: {}", message);
                self.set_state(LinkState::Failed(message));
            }
            TransportEvent::Frame { text } => self.ingest(text),
        }
    }

    fn ingest(&mut self, text: String) {
        self.stats.frames += 1;
        let parsed = parse_frame(&text);
        if parsed.is_empty() {
            debug!("Ignoring frame without recognized keys: {:?}", text);
            self.stats.skipped += 1;
            self.events.send(IngestEvent::Skipped { frame: text });
            return;
        }

        let reading = parsed.stamp(self.clock.now());
        match self.log.append(reading.clone()) {
            Ok(today_count) => {
                self.stats.stored += 1;
                self.events.send(IngestEvent::Stored {
                    reading,
                    today_count,
                });
            }
            Err(e) => {
                warn!("Reading not persisted: {}", e);
                self.stats.store_failures += 1;
                self.events.send(IngestEvent::StoreFailed {
                    reading,
                    message: e.to_string(),
                });
            }
        }
    }

    fn set_state(&mut self, state: LinkState) {
        if self.state != state {
            self.state = state.clone();
            self.events.send(IngestEvent::LinkChanged { state });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::events::DisconnectReason;
    use crate::mock::MockTransport;
    use gasmon_store::MemoryStore;
    use time::macros::datetime;

    fn clock() -> FixedClock {
        FixedClock::new(datetime!(2025-01-02 10:00 UTC))
    }

    // --- TodayLog ---

    #[test]
    fn test_append_caps_to_newest() {
        let store = MemoryStore::new();
        let log = TodayLog::with_capacity(&store, 3);
        for minute in 0..5u8 {
            let at = datetime!(2025-01-02 10:00 UTC) + time::Duration::minutes(minute.into());
            log.append(Reading::new(at)).unwrap();
        }

        let readings = TierStore::new(&store).readings().unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].date_time, datetime!(2025-01-02 10:02 UTC));
        assert_eq!(readings[2].date_time, datetime!(2025-01-02 10:04 UTC));
    }

    #[test]
    fn test_default_capacity() {
        let store = MemoryStore::new();
        assert_eq!(TodayLog::new(&store).capacity(), 100);
        assert_eq!(TodayLog::with_capacity(&store, 0).capacity(), 1);
    }

    // --- Collector ---

    #[tokio::test]
    async fn test_collector_stores_frames() {
        let store = MemoryStore::new();
        let source = MockTransport::from_frames([
            "Location:Kitchen,Etanol:25.3ppm,CO2:412.7ppm,CO:15.2ppm,NH3:8.9ppm",
            "Foo:1",
            "CO:2",
        ]);
        let mut collector = Collector::new(source, TodayLog::new(&store), clock());
        let mut events = collector.subscribe();

        let stats = collector.run().await;
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.stored, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(collector.state(), &LinkState::Disconnected);

        let readings = TierStore::new(&store).readings().unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].location.as_deref(), Some("Kitchen"));
        assert_eq!(readings[0].co2, Some(412.7));
        assert_eq!(readings[1].co, Some(2.0));
        assert_eq!(readings[1].date_time, datetime!(2025-01-02 10:00 UTC));

        assert!(matches!(
            events.recv().await,
            Ok(IngestEvent::LinkChanged {
                state: LinkState::Connected
            })
        ));
        assert!(matches!(
            events.recv().await,
            Ok(IngestEvent::Stored { today_count: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_failure_persists_until_reconnect() {
        let store = MemoryStore::new();
        let source = MockTransport::new()
            .connected()
            .error("link lost")
            .disconnected(DisconnectReason::Unknown);
        let mut collector = Collector::new(source, TodayLog::new(&store), clock());

        collector.step().await;
        assert!(collector.state().is_connected());
        collector.step().await;
        collector.step().await;
        assert_eq!(collector.state(), &LinkState::Failed("link lost".into()));

        collector.handle(TransportEvent::Connected);
        assert_eq!(collector.state(), &LinkState::Connected);
        assert!(!collector.step().await);
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_stop_collector() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let source = MockTransport::from_frames(["CO:1", "CO:2"]);
        let mut collector = Collector::new(source, TodayLog::new(&store), clock());

        let stats = collector.run().await;
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.store_failures, 2);
        assert_eq!(stats.stored, 0);

        store.set_unavailable(false);
        assert!(store.get("todays_data").unwrap().is_none());
    }
}
