//! MD5 checksums for corruption detection
//!
//! The digest only has to catch accidental damage (a blob overwritten by another
//! client, a truncated value, an eviction race), so a fast 128-bit hash is enough.

use crate::error::{Result, StoreError};
use md5::{Digest, Md5};

/// Hex length of a checksum (16 bytes)
pub const CHECKSUM_HEX_LEN: usize = 32;

/// An MD5 digest (16 bytes)
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Checksum([u8; 16]);

impl Checksum {
    /// Create a checksum from raw digest bytes
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Lowercase hex form, as stored in ledger records
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != CHECKSUM_HEX_LEN {
            return Err(StoreError::integrity(
                s,
                format!(
                    "checksum must be {} hex characters, got {}",
                    CHECKSUM_HEX_LEN,
                    s.len()
                ),
            ));
        }

        let mut bytes = [0u8; 16];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| StoreError::integrity(s, format!("malformed checksum: {}", e)))?;
        Ok(Self(bytes))
    }

    /// Compare against a stored hex checksum, ignoring case
    pub fn matches_hex(&self, stored: &str) -> bool {
        self.to_hex().eq_ignore_ascii_case(stored)
    }
}

impl std::fmt::Debug for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Checksum({})", self.to_hex())
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Digest bytes with MD5
pub fn digest(data: &[u8]) -> Checksum {
    let out = Md5::digest(data);
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&out);
    Checksum::from_bytes(bytes)
}
