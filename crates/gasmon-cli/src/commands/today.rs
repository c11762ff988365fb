//! Today command: view and save today's readings.

use anyhow::{Context, Result};
use gasmon_core::{RolloverManager, SaveOutcome, SystemClock, Tier};
use gasmon_store::Store;

use crate::cli::OutputFormat;
use crate::commands::view::print_tier;
use crate::format::FormatOptions;
use crate::util::{print_notice, run_rollover};

/// Execute the today command.
///
/// Readings from earlier days are archived into history before anything is
/// shown.
pub fn cmd_today(
    store: &Store,
    format: OutputFormat,
    save: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let report = run_rollover(store, false)?;
    print_notice(&report, format == OutputFormat::Text);

    if save {
        let outcome = RolloverManager::new(store, SystemClock)
            .save_daily_average()
            .context("Failed to save today's average")?;
        let message = match outcome {
            SaveOutcome::Saved { .. } => "Average saved to history and today's data cleared!",
            SaveOutcome::NothingToSave => "No data to save",
        };
        if format == OutputFormat::Text {
            println!("{}", message);
        } else {
            eprintln!("{}", message);
        }
    }

    print_tier(store, Tier::Today, format, opts)
}
