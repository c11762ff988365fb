//! History command: list stored daily averages.

use anyhow::Result;
use gasmon_core::Tier;
use gasmon_store::Store;

use crate::cli::OutputFormat;
use crate::commands::view::print_tier;
use crate::format::FormatOptions;

/// Execute the history command. No rollover is run.
pub fn cmd_history(store: &Store, format: OutputFormat, opts: &FormatOptions) -> Result<()> {
    print_tier(store, Tier::History, format, opts)
}
