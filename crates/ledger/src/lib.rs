//! File ledger kept inside the cache
//!
//! This crate provides:
//! - File records (name, size, checksum)
//! - The versioned ledger document and its encoding
//! - The ledger itself, with compare-and-swap updates

pub mod ledger;
pub mod record;

// Re-exports
pub use ledger::{Ledger, DEFAULT_CAS_ATTEMPTS, DEFAULT_LEDGER_KEY};
pub use record::FileRecord;
