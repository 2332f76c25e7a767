//! The ledger: one cache value holding every file record
//!
//! The cache has no multi-key transactions, so the whole mapping lives under a
//! single key and every mutation rewrites it. Writes go through memcached's
//! check-and-set: read with a token, mutate, write back only if the token still
//! matches, otherwise retry with backoff.

use crate::record::{FileRecord, LedgerDoc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;
use tomem_core::{validate_identifier, CacheBackend, IdGenerator, Result, StoreError};
use tracing::{debug, info, warn};

/// Cache key holding the ledger unless configured otherwise
pub const DEFAULT_LEDGER_KEY: &str = ":memledger:";

/// Compare-and-swap attempts before giving up on a mutation
pub const DEFAULT_CAS_ATTEMPTS: u32 = 16;

const BACKOFF_START: Duration = Duration::from_millis(2);
const BACKOFF_MAX: Duration = Duration::from_millis(100);

/// Identifier → record index stored in the cache
pub struct Ledger<B> {
    backend: Arc<B>,
    key: String,
    ids: Box<dyn IdGenerator>,
    cas_attempts: u32,
}

impl<B: CacheBackend> Ledger<B> {
    /// Ledger under the default key, minting identifiers with `ids`
    pub fn new(backend: Arc<B>, ids: impl IdGenerator + 'static) -> Self {
        Self {
            backend,
            key: DEFAULT_LEDGER_KEY.to_string(),
            ids: Box::new(ids),
            cas_attempts: DEFAULT_CAS_ATTEMPTS,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// At least two, so creating a missing ledger still leaves room to write it
    pub fn with_cas_attempts(mut self, attempts: u32) -> Self {
        self.cas_attempts = attempts.max(2);
        self
    }

    /// Cache key the ledger lives under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Look up one record
    pub fn get(&self, id: &str) -> Result<FileRecord> {
        self.snapshot()?
            .records
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Record a file, minting an identifier when none is given
    ///
    /// An existing record under the same identifier is replaced.
    pub fn put(&self, id: Option<&str>, record: FileRecord) -> Result<String> {
        let id = match id.filter(|id| !id.is_empty()) {
            Some(id) => {
                validate_identifier(id)?;
                id.to_string()
            }
            None => self.ids.generate()?,
        };

        if id == self.key {
            return Err(StoreError::InvalidIdentifier {
                id,
                reason: "reserved for the ledger itself".to_string(),
            });
        }

        let replaced = self.update(|records| Ok(records.insert(id.clone(), record.clone())))?;
        match replaced {
            Some(previous) => warn!(
                id = %id,
                previous = %previous.name,
                name = %record.name,
                "identifier already in ledger, previous record replaced"
            ),
            None => debug!(id = %id, name = %record.name, size = record.size, "record added"),
        }

        Ok(id)
    }

    /// Remove one record, returning it
    pub fn delete(&self, id: &str) -> Result<FileRecord> {
        let removed = self.update(|records| {
            records
                .remove(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        })?;
        debug!(id, "record removed");
        Ok(removed)
    }

    /// Identifier → file name for every record
    pub fn list(&self) -> Result<BTreeMap<String, String>> {
        Ok(self
            .snapshot()?
            .records
            .into_iter()
            .map(|(id, record)| (id, record.name))
            .collect())
    }

    /// Every record with full metadata
    pub fn records(&self) -> Result<BTreeMap<String, FileRecord>> {
        Ok(self.snapshot()?.records)
    }

    /// Sum of recorded sizes
    pub fn total_bytes(&self) -> Result<u64> {
        Ok(self.snapshot()?.records.values().map(|r| r.size).sum())
    }

    /// Get the total number of records
    pub fn len(&self) -> Result<usize> {
        Ok(self.snapshot()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop the ledger value itself; blobs are left alone
    pub fn clear(&self) -> Result<()> {
        let existed = self.backend.delete(&self.key)?;
        info!(key = %self.key, existed, "ledger cleared");
        Ok(())
    }

    /// Current ledger, empty if the key is absent
    fn snapshot(&self) -> Result<LedgerDoc> {
        match self.backend.get(&self.key)? {
            Some(bytes) => LedgerDoc::decode(&self.key, &bytes),
            None => Ok(LedgerDoc::default()),
        }
    }

    /// Read-modify-write the record map under compare-and-swap
    ///
    /// `mutate` may run several times and must be repeatable. An error from
    /// it aborts the update without writing.
    fn update<T>(
        &self,
        mut mutate: impl FnMut(&mut BTreeMap<String, FileRecord>) -> Result<T>,
    ) -> Result<T> {
        let mut backoff = BACKOFF_START;

        for attempt in 1..=self.cas_attempts {
            let current = match self.backend.get_versioned(&self.key)? {
                Some(current) => current,
                None => {
                    let created = self.backend.add(&self.key, &LedgerDoc::default().encode()?)?;
                    debug!(key = %self.key, created, "ledger missing, initialized");
                    continue;
                }
            };

            let mut doc = LedgerDoc::decode(&self.key, &current.value)?;
            let out = mutate(&mut doc.records)?;

            if self
                .backend
                .compare_and_swap(&self.key, &doc.encode()?, current.token)?
            {
                return Ok(out);
            }

            debug!(key = %self.key, attempt, "ledger changed concurrently, retrying");
            sleep(backoff);
            backoff = (backoff * 2).min(BACKOFF_MAX);
        }

        Err(StoreError::LedgerContention {
            attempts: self.cas_attempts,
        })
    }
}
