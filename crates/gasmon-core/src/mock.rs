//! Scripted transport for testing.
//!
//! [`MockTransport`] replays a fixed list of events, optionally with a delay
//! before each one, so collectors can be tested without a sensor.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;

use crate::events::{DisconnectReason, TransportEvent};
use crate::traits::FrameSource;

/// A [`FrameSource`] that replays scripted events.
///
/// # Example
///
/// ```
/// use gasmon_core::{DisconnectReason, MockTransport};
///
/// let transport = MockTransport::new()
///     .connected()
///     .frame("CO2:412ppm")
///     .error("link lost")
///     .disconnected(DisconnectReason::Unknown);
/// assert_eq!(transport.remaining(), 4);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    events: VecDeque<TransportEvent>,
    delay: Duration,
}

impl MockTransport {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// `Connected`, one `Frame` per item, then `Disconnected(EndOfStream)`.
    pub fn from_frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut mock = Self::new().connected();
        for frame in frames {
            mock = mock.frame(frame);
        }
        mock.disconnected(DisconnectReason::EndOfStream)
    }

    /// Append a `Connected` event.
    #[must_use]
    pub fn connected(self) -> Self {
        self.push(TransportEvent::Connected)
    }

    /// Append a frame.
    #[must_use]
    pub fn frame(self, text: impl Into<String>) -> Self {
        self.push(TransportEvent::frame(text))
    }

    /// Append an error.
    #[must_use]
    pub fn error(self, message: impl Into<String>) -> Self {
        self.push(TransportEvent::error(message))
    }

    /// Append a disconnect.
    #[must_use]
    pub fn disconnected(self, reason: DisconnectReason) -> Self {
        self.push(TransportEvent::disconnected(reason))
    }

    /// Append any event.
    #[must_use]
    pub fn push(mut self, event: TransportEvent) -> Self {
        self.events.push_back(event);
        self
    }

    /// Wait `delay` before delivering each event.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Events not yet delivered.
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl FrameSource for MockTransport {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        if self.events.is_empty() {
            return None;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.events.pop_front()
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
