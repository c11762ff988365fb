//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gasmon_core::{SnapshotFormat, Tier};

/// Output format for tier views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Snapshot file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl From<ExportFormat> for SnapshotFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Json => SnapshotFormat::Json,
            ExportFormat::Csv => SnapshotFormat::Csv,
        }
    }
}

/// Storage tier selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TierArg {
    /// Today's raw readings
    Today,
    /// Daily averages for the current month
    History,
    /// Monthly averages
    Monthly,
}

impl From<TierArg> for Tier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Today => Tier::Today,
            TierArg::History => Tier::History,
            TierArg::Monthly => Tier::Monthly,
        }
    }
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Parser)]
#[command(name = "gasmon")]
#[command(author, version, about = "Record and roll up gas sensor readings", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Database file (overrides config)
    #[arg(long, global = true, env = "GASMON_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record frames from a sensor stream (stdin by default)
    Listen {
        /// Read frames from a file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Record a single frame, e.g. "CO2:412.7ppm,CO:15.2ppm"
    Ingest {
        /// Raw frame text
        frame: String,
    },

    /// Show today's readings (archives earlier days first)
    Today {
        #[command(flatten)]
        output: OutputArgs,

        /// Save today's average to history and clear today's readings
        #[arg(long)]
        save: bool,
    },

    /// Show this month's daily averages (archives earlier days and months first)
    ThisMonth {
        #[command(flatten)]
        output: OutputArgs,

        /// Save this month's average and clear the daily averages
        #[arg(long)]
        save: bool,
    },

    /// Show stored daily averages
    History {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show stored monthly averages
    Monthly {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Export a tier to a snapshot file
    Export {
        /// Tier to export
        #[arg(value_enum)]
        tier: TierArg,

        /// Snapshot format (defaults to config, then json)
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,

        /// Directory to write the snapshot to (defaults to config, then the current directory)
        #[arg(short, long, conflicts_with = "stdout")]
        output: Option<PathBuf>,

        /// Print the snapshot instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Import a JSON snapshot into a tier, replacing entries with the same key
    Import {
        /// Tier to import into (history or monthly)
        #[arg(value_enum)]
        tier: TierArg,

        /// Read the snapshot from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Snapshot text given inline
        #[arg(short, long)]
        text: Option<String>,
    },

    /// Delete every entry of a tier
    Clear {
        /// Tier to clear
        #[arg(value_enum)]
        tier: TierArg,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Configuration subcommands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export_defaults() {
        let cli = Cli::try_parse_from(["gasmon", "export", "history"]).unwrap();
        match cli.command {
            Commands::Export {
                tier,
                format,
                output,
                stdout,
            } => {
                assert_eq!(Tier::from(tier), Tier::History);
                assert!(format.is_none());
                assert!(output.is_none());
                assert!(!stdout);
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn test_export_output_conflicts_with_stdout() {
        let result =
            Cli::try_parse_from(["gasmon", "export", "monthly", "--stdout", "-o", "/tmp"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_import_file_conflicts_with_text() {
        let result = Cli::try_parse_from([
            "gasmon", "import", "history", "--file", "a.json", "--text", "[]",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_db_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["gasmon", "today", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
    }

    #[test]
    fn test_this_month_subcommand_name() {
        let cli = Cli::try_parse_from(["gasmon", "this-month", "--save"]).unwrap();
        assert!(matches!(cli.command, Commands::ThisMonth { save: true, .. }));
    }

    #[test]
    fn test_export_format_maps_to_snapshot_format() {
        assert_eq!(SnapshotFormat::from(ExportFormat::Csv), SnapshotFormat::Csv);
        assert_eq!(SnapshotFormat::from(ExportFormat::Json), SnapshotFormat::Json);
    }
}
