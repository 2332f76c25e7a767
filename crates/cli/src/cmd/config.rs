//! Configuration command
//!
//! Shows the effective configuration, where it is read from, or a commented
//! default file to start from.

use anyhow::{Context, Result};
use cli_lib::config::{self, Config};
use owo_colors::OwoColorize;
use std::path::Path;

/// Print the effective configuration as TOML
pub fn run_show(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Show the config file path
pub fn run_path(explicit: Option<&Path>) -> Result<()> {
    let config_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => config::config_file_path().context("Could not determine config file path")?,
    };

    println!("{}", config_path.display());
    if !config_path.exists() {
        println!(
            "{}",
            "File does not exist; defaults are in effect. See 'tomem config example'.".yellow()
        );
    }

    Ok(())
}

/// Show example configuration
pub fn run_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}
