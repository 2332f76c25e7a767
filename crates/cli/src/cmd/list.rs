//! List stored files

use anyhow::{Context, Result};
use cli_lib::{util, Config, MemStore};
use owo_colors::OwoColorize;

pub fn run(config: &Config, long: bool) -> Result<()> {
    let store = MemStore::connect(config).context("Failed to connect to memcached")?;
    let files = store.stored_files().context("Failed to read the ledger")?;

    if files.is_empty() {
        println!("{}", "No files stored".dimmed());
        return Ok(());
    }

    for (id, record) in &files {
        util::display_record(id, record, long);
    }

    if long {
        let total: u64 = files.values().map(|r| r.size).sum();
        println!();
        println!("{} files, {}", files.len(), util::format_size(total));
    }

    Ok(())
}
