//! Utility functions for CLI operations.

use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, theme::ColorfulTheme};
use gasmon_core::{Clock, DayKey, RolloverManager, RolloverReport, SystemClock};
use gasmon_store::Store;

/// Open the database, creating it on first use.
pub fn open_store(path: &Path) -> Result<Store> {
    Store::open(path).with_context(|| format!("Failed to open database: {}", path.display()))
}

/// Run the rollover boundaries a view depends on.
///
/// `include_month` also runs the month boundary after the day boundary.
pub fn run_rollover(store: &Store, include_month: bool) -> Result<RolloverReport> {
    let manager = RolloverManager::new(store, SystemClock);
    if include_month {
        return manager.run().context("Failed to archive previous data");
    }

    let today = manager
        .roll_today()
        .context("Failed to archive previous days")?;
    Ok(RolloverReport {
        today,
        ..Default::default()
    })
}

/// Print what a rollover archived, if anything.
///
/// Goes to stderr when stdout carries machine-readable output.
pub fn print_notice(report: &RolloverReport, to_stdout: bool) {
    if let Some(notice) = report.notice() {
        if to_stdout {
            println!("{}", notice);
        } else {
            eprintln!("{}", notice);
        }
    }
}

/// Today's date on the system clock.
pub fn today() -> DayKey {
    SystemClock.today()
}

/// Read snapshot text from a file, inline text, or stdin.
pub fn read_input(file: Option<&PathBuf>, text: Option<String>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display())),
        None => {
            if io::stdin().is_terminal() {
                bail!("Please enter JSON data (use --file, --text, or pipe it on stdin)");
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Ask the user to confirm a destructive action.
///
/// Non-interactive sessions must pass `--yes`.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
        bail!("Refusing to continue without confirmation. Pass --yes to proceed.");
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to get user confirmation")
}

/// Write output to file or stdout
pub fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_input_prefers_text() {
        let text = read_input(None, Some("[]".to_string())).unwrap();
        assert_eq!(text, "[]");
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "[{\"date\":\"2025-01-01\"}]").unwrap();
        let text = read_input(Some(&path), None).unwrap();
        assert!(text.contains("2025-01-01"));
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Some(&PathBuf::from("/nonexistent/x.json")), None).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn test_confirm_assume_yes() {
        assert!(confirm("Clear?", true).unwrap());
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        write_output(Some(path.as_path()), "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_rollover_on_empty_store() {
        let store = Store::open_in_memory().unwrap();
        assert!(run_rollover(&store, true).unwrap().is_empty());
        assert!(store.list_keys().unwrap().is_empty());
    }
}
