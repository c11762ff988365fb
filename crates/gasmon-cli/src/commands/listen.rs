//! Listen command: record frames from a line-oriented stream.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use gasmon_core::{
    Collector, FrameSource, IngestEvent, LineSource, LinkState, SystemClock, TodayLog,
};
use gasmon_store::Store;
use tracing::debug;

use crate::format::{FormatOptions, format_live_reading};
use crate::util::{print_notice, run_rollover, today};

/// Execute the listen command.
///
/// Each line of the input is one frame. Earlier data is archived before the
/// first frame and again whenever a reading starts a new day.
pub async fn cmd_listen(
    store: &Store,
    input: Option<PathBuf>,
    cap: usize,
    opts: &FormatOptions,
    quiet: bool,
) -> Result<()> {
    let report = run_rollover(store, true)?;
    if !quiet {
        print_notice(&report, false);
    }

    let source: Box<dyn FrameSource> = match &input {
        Some(path) => Box::new(
            LineSource::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(LineSource::stdin()),
    };

    let mut collector = Collector::new(source, TodayLog::with_capacity(store, cap), SystemClock);
    let mut events = collector.subscribe();
    let mut current_day = today();

    while collector.step().await {
        while let Ok(event) = events.try_recv() {
            match event {
                IngestEvent::Stored {
                    reading,
                    today_count,
                } => {
                    debug!("Today's log holds {} readings", today_count);
                    let day = reading.day();
                    if day != current_day {
                        let report = run_rollover(store, true)?;
                        if !quiet {
                            print_notice(&report, false);
                        }
                        current_day = day;
                    }
                    if !quiet {
                        println!("{}", format_live_reading(&reading, opts));
                    }
                }
                IngestEvent::StoreFailed { message, .. } => {
                    eprintln!("Warning: reading not saved: {}", message);
                }
                IngestEvent::LinkChanged { state } => {
                    if !quiet {
                        eprintln!("Sensor {}", state);
                    }
                }
                _ => {}
            }
        }
    }

    let stats = collector.stats();
    if !quiet {
        eprintln!(
            "{} frames, {} stored, {} skipped, {} not saved",
            stats.frames, stats.stored, stats.skipped, stats.store_failures
        );
    }
    if let LinkState::Failed(message) = collector.state() {
        bail!("Sensor link failed: {}", message);
    }
    Ok(())
}
