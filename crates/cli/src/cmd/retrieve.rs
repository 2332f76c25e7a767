//! Retrieve a stored file

use anyhow::{Context, Result};
use cli_lib::{Config, MemStore};
use owo_colors::OwoColorize;
use std::path::Path;

pub fn run(config: &Config, id: &str, dest: Option<&Path>) -> Result<()> {
    let store = MemStore::connect(config).context("Failed to connect to memcached")?;

    let (path, record) = store
        .retrieve_file(id, dest)
        .with_context(|| format!("Failed to retrieve '{}'", id))?;

    println!(
        "{} Retrieved {} → {}",
        "✓".green(),
        record.name.yellow(),
        path.display().to_string().cyan()
    );

    Ok(())
}
