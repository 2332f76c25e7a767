//! memcached-backed implementation of [`CacheBackend`]

use crate::backend::{CacheBackend, Versioned};
use crate::error::{Result, StoreError};
use memcache::{CommandError, MemcacheError};
use std::collections::HashMap;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

/// Values never expire on their own; memcached may still evict them
const NO_EXPIRY: u32 = 0;

/// Connection settings for a memcached pool
#[derive(Debug, Clone)]
pub struct MemcachedOptions {
    /// `host:port` entries; keys are sharded across them by the client
    pub servers: Vec<String>,
    /// Bound on connects and on every read/write
    pub timeout: Duration,
}

impl Default for MemcachedOptions {
    fn default() -> Self {
        Self {
            servers: vec!["127.0.0.1:11211".to_string()],
            timeout: Duration::from_millis(1000),
        }
    }
}

/// Pooled memcached client speaking the binary protocol
pub struct MemcachedBackend {
    client: memcache::Client,
}

impl MemcachedBackend {
    /// Connect to every configured server, failing fast if any is unreachable
    pub fn connect(options: &MemcachedOptions) -> Result<Self> {
        if options.servers.is_empty() {
            return Err(StoreError::StoreUnavailable(
                "no memcached servers configured".to_string(),
            ));
        }

        // The pool retries silently until its checkout timeout; probe first so
        // a dead server surfaces within the configured timeout.
        for server in &options.servers {
            probe(server, options.timeout)?;
        }

        let urls: Vec<String> = options
            .servers
            .iter()
            .map(|server| {
                let secs = options.timeout.as_secs_f64();
                format!(
                    "memcache://{}?timeout={}&connect_timeout={}&tcp_nodelay=true",
                    server, secs, secs
                )
            })
            .collect();

        let client = memcache::Client::connect(urls).map_err(unavailable)?;
        let versions = client.version().map_err(unavailable)?;
        debug!(?versions, "connected to memcached");

        Ok(Self { client })
    }
}

fn probe(server: &str, timeout: Duration) -> Result<()> {
    let addrs = server.to_socket_addrs().map_err(|e| {
        StoreError::StoreUnavailable(format!("cannot resolve {}: {}", server, e))
    })?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(_) => return Ok(()),
            Err(e) => last_err = Some(e),
        }
    }

    Err(StoreError::StoreUnavailable(format!(
        "cannot reach memcached at {}: {}",
        server,
        last_err
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no addresses resolved".to_string())
    )))
}

fn unavailable(err: MemcacheError) -> StoreError {
    StoreError::StoreUnavailable(err.to_string())
}

/// Outcome of an `add`: only an existing key means "not stored"
fn added(result: std::result::Result<(), MemcacheError>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(MemcacheError::CommandError(CommandError::KeyExists)) => Ok(false),
        Err(err) => Err(unavailable(err)),
    }
}

impl CacheBackend for MemcachedBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.client.get::<Vec<u8>>(key).map_err(unavailable)
    }

    fn get_versioned(&self, key: &str) -> Result<Option<Versioned>> {
        let mut found: HashMap<String, (Vec<u8>, u32, Option<u64>)> =
            self.client.gets(&[key]).map_err(unavailable)?;

        match found.remove(key) {
            Some((value, _flags, Some(token))) => Ok(Some(Versioned { value, token })),
            Some((_, _, None)) => Err(StoreError::StoreUnavailable(format!(
                "server returned no cas token for '{}'",
                key
            ))),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.client.set(key, value, NO_EXPIRY).map_err(unavailable)
    }

    fn add(&self, key: &str, value: &[u8]) -> Result<bool> {
        let stored = added(self.client.add(key, value, NO_EXPIRY))?;
        if !stored {
            debug!(key, "add skipped, key already present");
        }
        Ok(stored)
    }

    fn compare_and_swap(&self, key: &str, value: &[u8], token: u64) -> Result<bool> {
        self.client
            .cas(key, value, NO_EXPIRY, token)
            .map_err(unavailable)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.client.delete(key).map_err(unavailable)
    }
}
