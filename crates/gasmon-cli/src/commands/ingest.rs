//! Ingest command: record one frame.

use anyhow::{Context, Result, bail};
use gasmon_core::{Clock, SystemClock, TodayLog, parse_frame};
use gasmon_store::Store;

use crate::format::{FormatOptions, format_live_reading};
use crate::util::{print_notice, run_rollover};

/// Execute the ingest command.
pub fn cmd_ingest(
    store: &Store,
    frame: &str,
    cap: usize,
    opts: &FormatOptions,
    quiet: bool,
) -> Result<()> {
    let parsed = parse_frame(frame);
    if parsed.is_empty() {
        bail!("Frame has no recognized keys: {:?}", frame);
    }

    let report = run_rollover(store, true)?;
    if !quiet {
        print_notice(&report, true);
    }
    let reading = parsed.stamp(SystemClock.now());
    let count = TodayLog::with_capacity(store, cap)
        .append(reading.clone())
        .context("Failed to save reading")?;

    if !quiet {
        println!("{}", format_live_reading(&reading, opts));
        println!("Data saved to today's storage ({} entries)", count);
    }
    Ok(())
}
