//! Config command: inspect and initialize the configuration file.

use anyhow::Result;

use crate::cli::ConfigAction;
use crate::config::Config;

/// Execute the config command.
pub fn cmd_config(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path().display());
        }
        ConfigAction::Init => {
            let path = Config::path();
            if path.exists() {
                println!("Config already exists at {}", path.display());
            } else {
                Config::default().save()?;
                println!("Created config at {}", path.display());
            }
        }
    }
    Ok(())
}
