//! Trait abstraction for frame transports.
//!
//! The rollup engine only consumes decoded text frames and lifecycle
//! notifications; discovery, pairing and retry belong to the transport.

use async_trait::async_trait;

use crate::events::TransportEvent;

/// A source of [`TransportEvent`]s.
///
/// # Example
///
/// ```
/// use gasmon_core::{FrameSource, MockTransport, TransportEvent};
///
/// #[tokio::main]
/// async fn main() {
///     let mut source = MockTransport::from_frames(["CO:2"]);
///     assert_eq!(source.next_event().await, Some(TransportEvent::Connected));
///     assert_eq!(source.next_event().await, Some(TransportEvent::frame("CO:2")));
/// }
/// ```
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next event; `None` once the source is exhausted.
    async fn next_event(&mut self) -> Option<TransportEvent>;

    /// Short description for log messages.
    fn describe(&self) -> String {
        "transport".to_string()
    }
}

#[async_trait]
impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        (**self).next_event().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
