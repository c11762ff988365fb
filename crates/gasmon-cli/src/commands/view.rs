//! Shared rendering of a tier for the view commands.

use anyhow::{Context, Result};
use gasmon_core::{ExportError, SnapshotFormat, Tier, TierStore, export_tier_as};
use gasmon_store::Store;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_daily_text, format_monthly_text, format_readings_text};
use crate::util::{today, write_output};

/// Render `tier` in the requested format.
///
/// JSON is the stored array as-is; CSV of an empty tier is empty.
pub fn render_tier(
    store: &Store,
    tier: Tier,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<String> {
    let tiers = TierStore::new(store);
    let context = || format!("Failed to load {} data", tier);

    let rendered = match format {
        OutputFormat::Text => match tier {
            Tier::Today => format_readings_text(&tiers.readings().with_context(context)?, opts),
            Tier::History => format_daily_text(&tiers.history().with_context(context)?, opts),
            Tier::Monthly => format_monthly_text(&tiers.monthly().with_context(context)?, opts),
        },
        OutputFormat::Json => {
            let values = tiers.load_values(tier).with_context(context)?;
            format!("{}\n", serde_json::to_string_pretty(&values)?)
        }
        OutputFormat::Csv => match export_tier_as(store, tier, today(), SnapshotFormat::Csv) {
            Ok(snapshot) => snapshot.contents,
            Err(ExportError::NothingToExport(_)) => String::new(),
            Err(e) => return Err(e).with_context(context),
        },
    };
    Ok(rendered)
}

/// Render `tier` and print it.
pub fn print_tier(
    store: &Store,
    tier: Tier,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<()> {
    let rendered = render_tier(store, tier, format, opts)?;
    write_output(None, &rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasmon_store::KeyValueStore;

    fn store_with_history() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .set(
                "data_history",
                r#"[{"date":"2025-01-02","etanol":1.25,"co2":400,"co":null,"nh3":0.5}]"#,
            )
            .unwrap();
        store
    }

    #[test]
    fn test_json_is_verbatim() {
        let store = store_with_history();
        let json = render_tier(
            &store,
            Tier::History,
            OutputFormat::Json,
            &FormatOptions::new(true),
        )
        .unwrap();
        let expected = "[\n  {\n    \"date\": \"2025-01-02\",\n    \"etanol\": 1.25,\n    \"co2\": 400,\n    \"co\": null,\n    \"nh3\": 0.5\n  }\n]\n";
        assert_eq!(json, expected);
    }

    #[test]
    fn test_text_table() {
        let store = store_with_history();
        let text = render_tier(
            &store,
            Tier::History,
            OutputFormat::Text,
            &FormatOptions::new(true),
        )
        .unwrap();
        assert!(text.contains("2025-01-02"));
        assert!(text.contains("400.0"));
        assert!(text.contains("N/A"));
    }

    #[test]
    fn test_csv_of_empty_tier_is_empty() {
        let store = Store::open_in_memory().unwrap();
        let csv = render_tier(
            &store,
            Tier::Monthly,
            OutputFormat::Csv,
            &FormatOptions::new(true),
        )
        .unwrap();
        assert!(csv.is_empty());
    }

    #[test]
    fn test_json_of_empty_tier() {
        let store = Store::open_in_memory().unwrap();
        let json = render_tier(
            &store,
            Tier::Today,
            OutputFormat::Json,
            &FormatOptions::new(true),
        )
        .unwrap();
        assert_eq!(json, "[]\n");
    }
}
