//! Clear command: delete a whole tier.

use anyhow::{Context, Result};
use gasmon_core::{Tier, TierStore};
use gasmon_store::Store;

use crate::util::confirm;

/// Execute the clear command.
pub fn cmd_clear(store: &Store, tier: Tier, yes: bool) -> Result<()> {
    let tiers = TierStore::new(store);
    let count = tiers
        .count(tier)
        .with_context(|| format!("Failed to read {} data", tier))?;
    if count == 0 {
        println!("No {} data to clear", tier);
        return Ok(());
    }

    let prompt = format!("Delete all {} {} entries?", count, tier);
    if !confirm(&prompt, yes)? {
        println!("Cancelled");
        return Ok(());
    }

    tiers
        .clear(tier)
        .with_context(|| format!("Failed to clear {} data", tier))?;
    println!("Cleared {} {} entries", count, tier);
    Ok(())
}
