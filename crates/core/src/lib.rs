//! tomem core - cache-side primitives for parking files in memcached
//!
//! This crate provides:
//! - The error taxonomy shared by every layer
//! - MD5 checksums for corruption detection
//! - The cache backend interface, an in-memory fake and a memcached client
//! - Blob storage keyed by identifier
//! - Word-list identifier generation

pub mod backend;
pub mod blob;
pub mod error;
pub mod hash;
pub mod ids;
pub mod memcached;

// Re-export main types for convenience
pub use backend::{CacheBackend, MemoryBackend, Versioned};
pub use blob::{BlobStore, DEFAULT_MAX_BLOB_BYTES};
pub use error::{Result, StoreError};
pub use hash::{digest, Checksum};
pub use ids::{validate_identifier, IdGenerator, WordListGenerator};
pub use memcached::{MemcachedBackend, MemcachedOptions};
