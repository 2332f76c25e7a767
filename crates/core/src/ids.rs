//! Human-readable identifiers drawn from a word list
//!
//! Generated identifiers are random dictionary words. They are not checked
//! against the ledger, so a collision overwrites the earlier record.

use crate::error::{Result, StoreError};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// System dictionary present on most Unix installs
pub const DEFAULT_WORD_LIST: &str = "/usr/share/dict/words";

/// Shorter words are rejected and redrawn
pub const DEFAULT_MIN_LEN: usize = 4;

/// Redraws before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// memcached's key length limit
pub const MAX_KEY_LEN: usize = 250;

/// Source of fresh identifiers
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<String>;
}

/// Check that an identifier can be used as a cache key
///
/// memcached's text protocol forbids whitespace and control characters in
/// keys and caps them at 250 bytes.
pub fn validate_identifier(id: &str) -> Result<()> {
    let reason = if id.is_empty() {
        Some("identifier is empty".to_string())
    } else if id.len() > MAX_KEY_LEN {
        Some(format!("longer than {} bytes", MAX_KEY_LEN))
    } else if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Some("contains whitespace or control characters".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StoreError::InvalidIdentifier {
            id: id.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Picks random words from a line-oriented word list
pub struct WordListGenerator {
    /// File to load on first use; `None` when built from an in-memory list
    path: Option<PathBuf>,
    words: Mutex<Option<Arc<Vec<String>>>>,
    min_len: usize,
    max_attempts: u32,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl WordListGenerator {
    /// Generator over a word-list file, read lazily on the first `generate`
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::build(Some(path.into()), None)
    }

    /// Generator over an in-memory list
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = words.into_iter().map(Into::into).collect();
        Self::build(None, Some(Arc::new(words)))
    }

    fn build(path: Option<PathBuf>, words: Option<Arc<Vec<String>>>) -> Self {
        Self {
            path,
            words: Mutex::new(words),
            min_len: DEFAULT_MIN_LEN,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
        }
    }

    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Replace the random source (seeded RNGs make tests reproducible)
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    fn words(&self) -> Result<Arc<Vec<String>>> {
        let mut slot = self.words.lock();
        if let Some(words) = slot.as_ref() {
            return Ok(words.clone());
        }

        let path = match &self.path {
            Some(path) => path,
            None => return Ok(Arc::new(Vec::new())),
        };

        let raw = std::fs::read(path)
            .map_err(|e| StoreError::invalid_path(path, format!("cannot read word list: {}", e)))?;
        let words: Vec<String> = String::from_utf8_lossy(&raw)
            .lines()
            .map(str::to_string)
            .collect();
        debug!(path = %path.display(), count = words.len(), "word list loaded");

        let words = Arc::new(words);
        *slot = Some(words.clone());
        Ok(words)
    }

    fn accept(&self, line: &str) -> Option<String> {
        let candidate = line.trim().to_lowercase();
        if candidate.chars().count() < self.min_len {
            return None;
        }
        validate_identifier(&candidate).ok()?;
        Some(candidate)
    }
}

impl IdGenerator for WordListGenerator {
    fn generate(&self) -> Result<String> {
        let words = self.words()?;
        if words.is_empty() {
            return Err(match &self.path {
                Some(path) => StoreError::invalid_path(path, "word list is empty"),
                None => StoreError::GeneratorExhausted {
                    attempts: 0,
                    min_len: self.min_len,
                },
            });
        }

        let mut rng = self.rng.lock();

        for _ in 0..self.max_attempts {
            let Some(line) = words.choose(&mut **rng) else {
                break;
            };
            if let Some(id) = self.accept(line) {
                return Ok(id);
            }
        }

        Err(StoreError::GeneratorExhausted {
            attempts: self.max_attempts,
            min_len: self.min_len,
        })
    }
}
