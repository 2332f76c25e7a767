//! Store files in memory

use anyhow::{Context, Result};
use cli_lib::{util, Config, MemStore};
use owo_colors::OwoColorize;

pub fn run(config: &Config, files: &[String], remove_source: bool) -> Result<()> {
    // 1. Connect before touching any file
    let store = MemStore::connect(config).context("Failed to connect to memcached")?;

    // 2. Store each file in argument order
    for arg in files {
        let (id, path) = util::parse_store_arg(arg);
        let (id, record) = store
            .store_file(&path, id.as_deref())
            .with_context(|| format!("Failed to store {}", path.display()))?;

        println!(
            "* {} - {} {}",
            id.yellow(),
            record.name,
            format!("({})", util::format_size(record.size)).dimmed()
        );

        // 3. Only drop the source once the blob is in the cache
        if remove_source {
            std::fs::remove_file(&path)
                .with_context(|| format!("Stored, but failed to remove {}", path.display()))?;
        }
    }

    Ok(())
}
