//! Monthly command: list stored monthly averages.

use anyhow::Result;
use gasmon_core::Tier;
use gasmon_store::Store;

use crate::cli::OutputFormat;
use crate::commands::view::print_tier;
use crate::format::FormatOptions;

/// Execute the monthly command. No rollover is run.
pub fn cmd_monthly(store: &Store, format: OutputFormat, opts: &FormatOptions) -> Result<()> {
    print_tier(store, Tier::Monthly, format, opts)
}
