//! Import command: merge a JSON snapshot into a tier.

use std::path::PathBuf;

use anyhow::{Result, bail};
use gasmon_core::{ImportError, Reconciler, Tier};
use gasmon_store::Store;
use tracing::warn;

use crate::util::read_input;

/// Execute the import command.
///
/// Entries replace resident ones with the same key. A rejected snapshot
/// leaves the tier untouched.
pub fn cmd_import(
    store: &Store,
    tier: Tier,
    file: Option<PathBuf>,
    text: Option<String>,
) -> Result<()> {
    let input = read_input(file.as_ref(), text)?;

    match Reconciler::new(store).import(tier, &input) {
        Ok(report) => {
            if report.rejected > 0 {
                warn!("Skipped {} invalid entries", report.rejected);
            }
            println!("{}", report);
            Ok(())
        }
        Err(ImportError::Store(e)) => {
            Err(anyhow::Error::new(e).context("Failed to save imported data"))
        }
        Err(e) => bail!("Import failed: {}", e),
    }
}
