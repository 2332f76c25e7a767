//! Raw file bytes keyed by identifier

use crate::backend::CacheBackend;
use crate::error::{Result, StoreError};
use std::sync::Arc;
use tracing::debug;

/// Just under memcached's default 1 MiB item size, leaving room for item overhead
pub const DEFAULT_MAX_BLOB_BYTES: u64 = 1_000_000;

/// Blob storage on top of a shared cache backend
pub struct BlobStore<B> {
    backend: Arc<B>,
    /// Largest value accepted by `put`
    max_blob_bytes: u64,
}

impl<B: CacheBackend> BlobStore<B> {
    /// Create a new blob store with the default size bound
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
        }
    }

    pub fn with_max_blob_bytes(mut self, max_blob_bytes: u64) -> Self {
        self.max_blob_bytes = max_blob_bytes;
        self
    }

    pub fn max_blob_bytes(&self) -> u64 {
        self.max_blob_bytes
    }

    /// Reject sizes the backend would refuse or truncate
    pub fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_blob_bytes {
            return Err(StoreError::BlobTooLarge {
                size,
                limit: self.max_blob_bytes,
            });
        }
        Ok(())
    }

    /// Write a blob, replacing whatever the key held
    pub fn put(&self, id: &str, bytes: &[u8]) -> Result<()> {
        self.check_size(bytes.len() as u64)?;
        self.backend.set(id, bytes)?;
        debug!(id, size = bytes.len(), "blob stored");
        Ok(())
    }

    /// Read a blob; eviction and "never stored" both come back as `NotFound`
    pub fn get(&self, id: &str) -> Result<Vec<u8>> {
        self.backend
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Delete a blob if present
    pub fn delete(&self, id: &str) -> Result<()> {
        let removed = self.backend.delete(id)?;
        debug!(id, removed, "blob deleted");
        Ok(())
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.backend.get(id)?.is_some())
    }
}
