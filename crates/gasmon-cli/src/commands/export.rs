//! Export command: write a tier snapshot.

use std::path::Path;

use anyhow::{Context, Result};
use gasmon_core::{ExportError, SnapshotFormat, Tier, export_tier_as};
use gasmon_store::Store;

use crate::util::{today, write_output};

/// Execute the export command.
///
/// Writes `<label>-<date>.<ext>` into `dir`, or prints the snapshot when
/// `stdout` is set. An empty tier is reported and nothing is written.
pub fn cmd_export(
    store: &Store,
    tier: Tier,
    format: SnapshotFormat,
    dir: &Path,
    stdout: bool,
) -> Result<()> {
    let snapshot = match export_tier_as(store, tier, today(), format) {
        Ok(snapshot) => snapshot,
        Err(ExportError::NothingToExport(tier)) => {
            eprintln!("No {} data to export", tier);
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to export"),
    };

    if stdout {
        return write_output(None, &format!("{}\n", snapshot.contents));
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(&snapshot.filename);
    write_output(Some(path.as_path()), &snapshot.contents)?;
    println!(
        "Exported {} {} entries to {}",
        snapshot.entries,
        tier,
        path.display()
    );
    Ok(())
}
