//! Line-oriented transport over any async reader.
//!
//! A serial bridge or a BLE-to-stdout helper typically emits one frame per
//! line. [`LineSource`] turns such a stream into [`TransportEvent`]s:
//! `Connected` first, one `Frame` per non-blank line, an `Error` if reading
//! fails, and finally `Disconnected`.

use std::path::Path;

use async_trait::async_trait;
use futures::stream::{self, Stream};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, warn};

use crate::events::{DisconnectReason, TransportEvent};
use crate::traits::FrameSource;

#[derive(Debug)]
enum Phase {
    Start,
    Streaming,
    Closing(DisconnectReason),
    Done,
}

/// A [`FrameSource`] reading one frame per line.
#[derive(Debug)]
pub struct LineSource<R> {
    lines: Lines<R>,
    phase: Phase,
    label: String,
    frames: u64,
}

impl<R: AsyncBufRead + Unpin + Send> LineSource<R> {
    /// Read frames from `reader`.
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            phase: Phase::Start,
            label: label.into(),
            frames: 0,
        }
    }

    /// Number of frames emitted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl LineSource<BufReader<Stdin>> {
    /// Read frames from standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), "stdin")
    }
}

impl LineSource<BufReader<File>> {
    /// Read frames from a file.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> FrameSource for LineSource<R> {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::Start => {
                debug!("Reading frames from {}", self.label);
                self.phase = Phase::Streaming;
                Some(TransportEvent::Connected)
            }
            Phase::Streaming => loop {
                match self.lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        self.frames += 1;
                        self.phase = Phase::Streaming;
                        return Some(TransportEvent::frame(line));
                    }
                    Ok(None) => {
                        debug!("{} ended after {} frames", self.label, self.frames);
                        return Some(TransportEvent::disconnected(
                            DisconnectReason::EndOfStream,
                        ));
                    }
                    Err(e) => {
                        warn!("Read from {} failed: {}", self.label, e);
                        self.phase = Phase::Closing(DisconnectReason::LinkError(e.to_string()));
                        return Some(TransportEvent::error(e.to_string()));
                    }
                }
            },
            Phase::Closing(reason) => Some(TransportEvent::disconnected(reason)),
            Phase::Done => None,
        }
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Adapt a [`FrameSource`] into a [`Stream`] of events.
pub fn event_stream<T: FrameSource>(source: T) -> impl Stream<Item = TransportEvent> + Send {
    stream::unfold(source, |mut source| async move {
        let event = source.next_event().await?;
        Some((event, source))
    })
}
