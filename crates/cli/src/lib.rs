//! tomem library - parking files in memcached
//!
//! The binary is a thin layer over [`MemStore`], which coordinates the ledger
//! and the blob store.

pub mod config;
pub mod memstore;
pub mod util;

pub use config::Config;
pub use memstore::{FlushReport, MemStore};
