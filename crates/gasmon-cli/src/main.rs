//! gasmon command-line interface.

mod cli;
mod commands;
mod config;
mod format;
mod util;

use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use gasmon_core::SnapshotFormat;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{
    cmd_clear, cmd_config, cmd_export, cmd_history, cmd_import, cmd_ingest, cmd_listen,
    cmd_monthly, cmd_this_month, cmd_today,
};
use config::{Config, resolve_database, resolve_export_dir};
use format::FormatOptions;
use util::open_store;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "gasmon", &mut io::stdout());
        return Ok(());
    }

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = Config::load();
    let opts = FormatOptions::new(cli.no_color || config.no_color);

    if let Commands::Config { action } = cli.command {
        return cmd_config(action, &config);
    }

    let db_path = resolve_database(cli.db, &config);
    tracing::debug!("Using database {}", db_path.display());
    let store = open_store(&db_path)?;

    match cli.command {
        Commands::Listen { input } => {
            cmd_listen(&store, input, config.today_cap, &opts, cli.quiet).await
        }
        Commands::Ingest { frame } => {
            cmd_ingest(&store, &frame, config.today_cap, &opts, cli.quiet)
        }
        Commands::Today { output, save } => cmd_today(&store, output.format, save, &opts),
        Commands::ThisMonth { output, save } => {
            cmd_this_month(&store, output.format, save, &opts)
        }
        Commands::History { output } => cmd_history(&store, output.format, &opts),
        Commands::Monthly { output } => cmd_monthly(&store, output.format, &opts),
        Commands::Export {
            tier,
            format,
            output,
            stdout,
        } => {
            let format = format.map(SnapshotFormat::from).unwrap_or(config.export_format);
            let dir = resolve_export_dir(output, &config);
            cmd_export(&store, tier.into(), format, &dir, stdout)
        }
        Commands::Import { tier, file, text } => cmd_import(&store, tier.into(), file, text),
        Commands::Clear { tier, yes } => cmd_clear(&store, tier.into(), yes),
        Commands::Config { .. } | Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    }
}
