//! Shared utilities for CLI commands

use ledger::FileRecord;
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Separates a custom identifier from the path in `store` arguments
pub const ID_SEPARATOR: &str = "::";

/// Split a `store` argument into an optional identifier and a path
///
/// `customid::/tmp/data.bin` picks the identifier, a bare path lets one be
/// generated. Only the first separator counts.
pub fn parse_store_arg(arg: &str) -> (Option<String>, PathBuf) {
    match arg.split_once(ID_SEPARATOR) {
        Some((id, path)) if !id.is_empty() => (Some(id.to_string()), PathBuf::from(path)),
        Some((_, path)) => (None, PathBuf::from(path)),
        None => (None, PathBuf::from(arg)),
    }
}

/// Format file size in human-readable binary units
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Display a record as `* id - name`, with size and checksum when `long`
pub fn display_record(id: &str, record: &FileRecord, long: bool) {
    if long {
        println!(
            "* {} - {} {} {}",
            id.yellow(),
            record.name,
            format!("({})", format_size(record.size)).dimmed(),
            record.checksum.dimmed()
        );
    } else {
        println!("* {} - {}", id.yellow(), record.name);
    }
}
