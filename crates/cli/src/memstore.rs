//! Store and retrieve whole files through the ledger and blob store
//!
//! Ordering matters and nothing is transactional: `store_file` writes the
//! ledger record before the blob, so a failed blob write leaves a dangling
//! record that `retrieve_file` later reports as `CorruptedState`. Retrieval is
//! destructive; a successful pickup deletes both the blob and the record.

use crate::config::Config;
use ledger::{FileRecord, Ledger};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tomem_core::{
    digest, BlobStore, CacheBackend, MemcachedBackend, Result, StoreError, WordListGenerator,
};
use tracing::{info, warn};

/// Outcome of [`MemStore::flush_all`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushReport {
    /// Records the ledger held
    pub files: usize,
    /// Sum of their recorded sizes
    pub bytes_freed: u64,
    /// Blob deletions that failed and were skipped
    pub blob_failures: usize,
}

/// File parking on top of a cache backend
pub struct MemStore<B> {
    ledger: Ledger<B>,
    blobs: BlobStore<B>,
}

impl MemStore<MemcachedBackend> {
    /// Connect to memcached and wire everything up from configuration
    pub fn connect(config: &Config) -> Result<Self> {
        let backend = Arc::new(MemcachedBackend::connect(&config.memcached_options())?);

        let ids = WordListGenerator::from_path(&config.identifiers.word_list)
            .with_min_len(config.identifiers.min_len)
            .with_max_attempts(config.identifiers.max_attempts);
        let ledger = Ledger::new(backend.clone(), ids)
            .with_key(config.ledger.key.clone())
            .with_cas_attempts(config.ledger.cas_attempts);
        let blobs = BlobStore::new(backend).with_max_blob_bytes(config.cache.max_blob_bytes);

        Ok(Self::new(ledger, blobs))
    }
}

impl<B: CacheBackend> MemStore<B> {
    pub fn new(ledger: Ledger<B>, blobs: BlobStore<B>) -> Self {
        Self { ledger, blobs }
    }

    pub fn ledger(&self) -> &Ledger<B> {
        &self.ledger
    }

    pub fn blobs(&self) -> &BlobStore<B> {
        &self.blobs
    }

    /// Park a file under `id`, or under a generated identifier
    pub fn store_file(&self, path: &Path, id: Option<&str>) -> Result<(String, FileRecord)> {
        let (name, bytes) = read_source(path)?;
        self.blobs.check_size(bytes.len() as u64)?;

        let record = FileRecord::for_bytes(name, &bytes);
        let id = self.ledger.put(id, record.clone())?;
        self.blobs.put(&id, &bytes)?;

        info!(id = %id, name = %record.name, size = record.size, "file stored");
        Ok((id, record))
    }

    /// Pick up a parked file, writing it to `dest` (or the working directory)
    ///
    /// Returns the path actually written along with the record.
    pub fn retrieve_file(&self, id: &str, dest: Option<&Path>) -> Result<(PathBuf, FileRecord)> {
        let record = self.ledger.get(id)?;

        let bytes = match self.blobs.get(id) {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound(_)) => return Err(StoreError::CorruptedState(id.to_string())),
            Err(e) => return Err(e),
        };

        if bytes.len() as u64 != record.size {
            return Err(StoreError::integrity(
                id,
                format!("expected {} bytes, cache holds {}", record.size, bytes.len()),
            ));
        }
        if !digest(&bytes).matches_hex(&record.checksum) {
            return Err(StoreError::integrity(id, "checksum mismatch"));
        }

        let target = destination_for(dest, &record.name)?;
        write_new(&target, &bytes, id, record.size)?;

        self.blobs.delete(id)?;
        match self.ledger.delete(id) {
            Ok(_) => {}
            Err(StoreError::NotFound(_)) => {
                warn!(id, "record already removed by another client")
            }
            Err(e) => return Err(e),
        }

        info!(id, path = %target.display(), size = record.size, "file retrieved");
        Ok((target, record))
    }

    /// Identifier → file name for every parked file
    pub fn list_files(&self) -> Result<BTreeMap<String, String>> {
        self.ledger.list()
    }

    /// Every parked file with full metadata
    pub fn stored_files(&self) -> Result<BTreeMap<String, FileRecord>> {
        self.ledger.records()
    }

    /// Delete every parked file and the ledger
    pub fn flush_all(&self) -> Result<FlushReport> {
        let records = self.ledger.records()?;
        let bytes_freed = records.values().map(|r| r.size).sum();

        let mut blob_failures = 0;
        for id in records.keys() {
            if let Err(e) = self.blobs.delete(id) {
                warn!(id = %id, error = %e, "failed to delete blob, continuing");
                blob_failures += 1;
            }
        }

        self.ledger.clear()?;

        let report = FlushReport {
            files: records.len(),
            bytes_freed,
            blob_failures,
        };
        info!(?report, "ledger flushed");
        Ok(report)
    }
}

/// Read a whole regular file, returning its base name and bytes
fn read_source(path: &Path) -> Result<(String, Vec<u8>)> {
    let meta = fs::metadata(path).map_err(|e| StoreError::invalid_path(path, e.to_string()))?;
    if !meta.is_file() {
        return Err(StoreError::invalid_path(path, "not a regular file"));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| StoreError::invalid_path(path, "path has no file name"))?;
    let bytes = fs::read(path)
        .map_err(|e| StoreError::invalid_path(path, format!("unable to read file: {}", e)))?;

    Ok((name, bytes))
}

/// Resolve where a retrieved file goes
///
/// A directory receives `name` inside it, no destination means the working
/// directory, anything else must be a free path in an existing directory. Only
/// the final component of `name` is used, since records come from a shared cache.
fn destination_for(dest: Option<&Path>, name: &str) -> Result<PathBuf> {
    let file_name = Path::new(name).file_name().ok_or_else(|| {
        StoreError::invalid_path(Path::new(name), "stored name is not a file name")
    })?;

    let target = match dest {
        None => std::env::current_dir()
            .map_err(|e| StoreError::invalid_path(Path::new("."), e.to_string()))?
            .join(file_name),
        Some(dir) if dir.is_dir() => dir.join(file_name),
        Some(path) => path.to_path_buf(),
    };

    if fs::symlink_metadata(&target).is_ok() {
        return Err(StoreError::invalid_path(&target, "already exists"));
    }

    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(StoreError::invalid_path(&target, "parent directory does not exist"));
    }

    Ok(target)
}

/// Create `target` (never overwriting) and check the written length
fn write_new(target: &Path, bytes: &[u8], id: &str, expected: u64) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => StoreError::invalid_path(target, "already exists"),
            _ => StoreError::invalid_path(target, e.to_string()),
        })?;

    let written = file
        .write_all(bytes)
        .and_then(|_| file.sync_all())
        .and_then(|_| file.metadata().map(|m| m.len()));

    match written {
        Ok(len) if len == expected => Ok(()),
        Ok(len) => {
            let _ = fs::remove_file(target);
            Err(StoreError::integrity(
                id,
                format!("wrote {} bytes, expected {}", len, expected),
            ))
        }
        Err(e) => {
            let _ = fs::remove_file(target);
            Err(StoreError::invalid_path(target, format!("write failed: {}", e)))
        }
    }
}
