//! Transport and ingestion events.
//!
//! [`TransportEvent`]s flow from a [`FrameSource`](crate::FrameSource) into
//! the collector. [`IngestEvent`]s flow out of the collector to any number of
//! subscribers through an [`EventDispatcher`].

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use gasmon_types::Reading;

use crate::ingest::LinkState;

/// Events delivered by a transport.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum TransportEvent {
    /// The link to the sensor is up.
    Connected,
    /// The link went down.
    Disconnected { reason: DisconnectReason },
    /// The link reported a failure.
    Error { message: String },
    /// One raw text frame.
    Frame { text: String },
}

impl TransportEvent {
    /// A frame event.
    pub fn frame(text: impl Into<String>) -> Self {
        Self::Frame { text: text.into() }
    }

    /// An error event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// A disconnect event.
    pub fn disconnected(reason: DisconnectReason) -> Self {
        Self::Disconnected { reason }
    }
}

/// Reason for disconnection.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new reasons
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DisconnectReason {
    /// Normal disconnection requested by user.
    UserRequested,
    /// The input ran out.
    EndOfStream,
    /// The link failed.
    LinkError(String),
    /// Unknown reason.
    Unknown,
}

/// Events emitted by the collector.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum IngestEvent {
    /// The link state changed.
    LinkChanged { state: LinkState },
    /// A reading was appended to the today tier.
    Stored { reading: Reading, today_count: usize },
    /// A frame carried no recognized keys.
    Skipped { frame: String },
    /// A reading could not be persisted.
    StoreFailed { reading: Reading, message: String },
}

/// Sender for ingestion events.
pub type EventSender = broadcast::Sender<IngestEvent>;

/// Receiver for ingestion events.
pub type EventReceiver = broadcast::Receiver<IngestEvent>;

/// Fan-out of ingestion events to multiple receivers.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    sender: EventSender,
}

impl EventDispatcher {
    /// Create a new event dispatcher.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Send an event.
    pub fn send(&self, event: IngestEvent) {
        // Ignore error if no receivers
        let _ = self.sender.send(event);
    }

    /// Get the number of active receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(100)
    }
}
