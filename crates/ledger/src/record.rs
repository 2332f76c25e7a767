//! File records and the serialized ledger document

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tomem_core::{digest, Result, StoreError};

/// Metadata kept for one parked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Base name of the source file, used as the default destination name
    pub name: String,
    /// Length of the blob in bytes
    pub size: u64,
    /// Lowercase hex MD5 of the blob
    pub checksum: String,
}

impl FileRecord {
    /// Describe `bytes` as a file called `name`
    pub fn for_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            checksum: digest(bytes).to_hex(),
        }
    }
}

/// The whole ledger as stored under the ledger key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LedgerDoc {
    pub format: u32,
    pub records: BTreeMap<String, FileRecord>,
}

impl LedgerDoc {
    pub const FORMAT: u32 = 1;

    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| {
            StoreError::StoreUnavailable(format!("failed to encode ledger: {}", e))
        })
    }

    pub fn decode(key: &str, bytes: &[u8]) -> Result<Self> {
        let doc: LedgerDoc = bincode::deserialize(bytes).map_err(|e| StoreError::MalformedLedger {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        if doc.format != Self::FORMAT {
            return Err(StoreError::MalformedLedger {
                key: key.to_string(),
                reason: format!(
                    "unsupported format {} (expected {})",
                    doc.format,
                    Self::FORMAT
                ),
            });
        }
        Ok(doc)
    }
}

impl Default for LedgerDoc {
    fn default() -> Self {
        Self {
            format: Self::FORMAT,
            records: BTreeMap::new(),
        }
    }
}
