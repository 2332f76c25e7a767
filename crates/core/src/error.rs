//! Error taxonomy shared by the ledger, blob store and orchestrator

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that can go wrong while parking or picking up a file
#[derive(Debug, Error)]
pub enum StoreError {
    /// Source file unreadable, or destination invalid or already present
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },

    /// Identifier absent from the ledger
    #[error("unknown identifier: {0}")]
    NotFound(String),

    /// Ledger references a blob the cache no longer holds
    #[error("ledger references '{0}' but its blob is missing from the cache (evicted or partially stored)")]
    CorruptedState(String),

    /// Size or checksum mismatch between the record and the bytes
    #[error("integrity check failed for '{id}': {reason}, file may be corrupted")]
    Integrity { id: String, reason: String },

    /// Cache unreachable, timed out, or refused the command
    #[error("cache backend unavailable: {0}")]
    StoreUnavailable(String),

    /// Word list yielded no acceptable identifier
    #[error("no identifier of at least {min_len} characters found after {attempts} attempts")]
    GeneratorExhausted { attempts: u32, min_len: usize },

    /// Identifier is not usable as a cache key
    #[error("invalid identifier '{id}': {reason}")]
    InvalidIdentifier { id: String, reason: String },

    /// Blob larger than the configured per-value bound
    #[error("blob of {size} bytes exceeds the configured limit of {limit} bytes")]
    BlobTooLarge { size: u64, limit: u64 },

    /// Ledger value present but undecodable
    #[error("ledger at '{key}' could not be decoded: {reason}")]
    MalformedLedger { key: String, reason: String },

    /// Compare-and-swap lost to other writers on every attempt
    #[error("ledger update lost {attempts} compare-and-swap races in a row")]
    LedgerContention { attempts: u32 },
}

impl StoreError {
    pub fn invalid_path(path: &Path, reason: impl Into<String>) -> Self {
        StoreError::InvalidPath {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn integrity(id: &str, reason: impl Into<String>) -> Self {
        StoreError::Integrity {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether a caller may reasonably try the same operation again later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::StoreUnavailable(_) | StoreError::LedgerContention { .. }
        )
    }
}

/// Result type used throughout tomem-core
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
