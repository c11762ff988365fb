//! This-month command: view and save the current month's daily averages.

use anyhow::{Context, Result};
use gasmon_core::{RolloverManager, SaveOutcome, SystemClock, Tier};
use gasmon_store::Store;

use crate::cli::OutputFormat;
use crate::commands::view::print_tier;
use crate::format::FormatOptions;
use crate::util::{print_notice, run_rollover};

/// Execute the this-month command.
///
/// Runs the full rollover first, so the listing holds only days of the
/// current month.
pub fn cmd_this_month(
    store: &Store,
    format: OutputFormat,
    save: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let report = run_rollover(store, true)?;
    print_notice(&report, format == OutputFormat::Text);

    if save {
        let outcome = RolloverManager::new(store, SystemClock)
            .save_monthly_average()
            .context("Failed to save this month's average")?;
        let message = match outcome {
            SaveOutcome::Saved { entries, .. } => format!(
                "Monthly average saved ({} days averaged) and this month's data cleared!",
                entries
            ),
            SaveOutcome::NothingToSave => "No data to save".to_string(),
        };
        if format == OutputFormat::Text {
            println!("{}", message);
        } else {
            eprintln!("{}", message);
        }
    }

    print_tier(store, Tier::History, format, opts)
}
