//! Configuration file handling
//!
//! Settings live in `$TOMEM_CONFIG` or `<config dir>/tomem/config.toml`. A
//! missing file means defaults; every section and key is optional.

use anyhow::{Context, Result};
use ledger::{DEFAULT_CAS_ATTEMPTS, DEFAULT_LEDGER_KEY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tomem_core::ids::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MIN_LEN, DEFAULT_WORD_LIST};
use tomem_core::{validate_identifier, MemcachedOptions, DEFAULT_MAX_BLOB_BYTES};

/// Environment variable pointing at an alternate config file
pub const CONFIG_ENV: &str = "TOMEM_CONFIG";

const MAX_BLOB_CEILING: u64 = 1024 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub ledger: LedgerConfig,
    pub identifiers: IdentifierConfig,
}

/// `[cache]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// memcached servers as `host:port`
    pub servers: Vec<String>,
    /// Network timeout for every cache call
    pub timeout_ms: u64,
    /// Largest file accepted by `store`
    pub max_blob_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            servers: vec!["127.0.0.1:11211".to_string()],
            timeout_ms: 1000,
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
        }
    }
}

/// `[ledger]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Cache key holding the ledger
    pub key: String,
    /// Compare-and-swap attempts per ledger mutation
    pub cas_attempts: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_LEDGER_KEY.to_string(),
            cas_attempts: DEFAULT_CAS_ATTEMPTS,
        }
    }
}

/// `[identifiers]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierConfig {
    pub word_list: PathBuf,
    pub min_len: usize,
    pub max_attempts: u32,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            word_list: PathBuf::from(DEFAULT_WORD_LIST),
            min_len: DEFAULT_MIN_LEN,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.cache.servers.is_empty() {
            anyhow::bail!("cache.servers must list at least one server");
        }
        if !(1..=60_000).contains(&self.cache.timeout_ms) {
            anyhow::bail!(
                "cache.timeout_ms must be between 1 and 60000 (got {})",
                self.cache.timeout_ms
            );
        }
        if !(1..=MAX_BLOB_CEILING).contains(&self.cache.max_blob_bytes) {
            anyhow::bail!(
                "cache.max_blob_bytes must be between 1 and {} (got {})",
                MAX_BLOB_CEILING,
                self.cache.max_blob_bytes
            );
        }
        if !(2..=1000).contains(&self.ledger.cas_attempts) {
            anyhow::bail!(
                "ledger.cas_attempts must be between 2 and 1000 (got {})",
                self.ledger.cas_attempts
            );
        }
        validate_identifier(&self.ledger.key).context("ledger.key is not a valid cache key")?;
        if !(1..=64).contains(&self.identifiers.min_len) {
            anyhow::bail!(
                "identifiers.min_len must be between 1 and 64 (got {})",
                self.identifiers.min_len
            );
        }
        if !(1..=100_000).contains(&self.identifiers.max_attempts) {
            anyhow::bail!(
                "identifiers.max_attempts must be between 1 and 100000 (got {})",
                self.identifiers.max_attempts
            );
        }
        Ok(())
    }

    /// Load from an explicit file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        let path = config_file_path().context("Could not determine config file path")?;
        Self::load_from(&path)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    pub fn memcached_options(&self) -> MemcachedOptions {
        MemcachedOptions {
            servers: self.cache.servers.clone(),
            timeout: Duration::from_millis(self.cache.timeout_ms),
        }
    }
}

/// `$TOMEM_CONFIG`, else `<config dir>/tomem/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("tomem").join("config.toml"))
}

/// Commented config file with every default spelled out
pub fn example_config() -> String {
    format!(
        r#"# tomem configuration

[cache]
# memcached servers; keys are sharded across them
servers = ["127.0.0.1:11211"]
# timeout for connects and every cache call
timeout_ms = 1000
# files larger than this are refused (memcached's default item limit is 1 MiB)
max_blob_bytes = {max_blob}

[ledger]
# cache key holding the file ledger; share it to share files
key = "{key}"
# compare-and-swap attempts before a ledger update gives up
cas_attempts = {cas}

[identifiers]
# word list used for generated identifiers
word_list = "{words}"
min_len = {min_len}
max_attempts = {max_attempts}
"#,
        max_blob = DEFAULT_MAX_BLOB_BYTES,
        key = DEFAULT_LEDGER_KEY,
        cas = DEFAULT_CAS_ATTEMPTS,
        words = DEFAULT_WORD_LIST,
        min_len = DEFAULT_MIN_LEN,
        max_attempts = DEFAULT_MAX_ATTEMPTS,
    )
}
