//! Wipe every stored file

use anyhow::{Context, Result};
use cli_lib::{util, Config, MemStore};
use owo_colors::OwoColorize;

pub fn run(config: &Config) -> Result<()> {
    let store = MemStore::connect(config).context("Failed to connect to memcached")?;
    let report = store.flush_all().context("Failed to flush stored files")?;

    println!(
        "{} items deleted freeing {}",
        report.files,
        util::format_size(report.bytes_freed).green()
    );

    if report.blob_failures > 0 {
        println!(
            "{}",
            format!(
                "{} blobs could not be deleted and will linger until evicted",
                report.blob_failures
            )
            .yellow()
        );
    }

    Ok(())
}
