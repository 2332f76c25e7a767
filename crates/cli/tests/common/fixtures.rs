//! In-memory stores and scratch directories for workflow tests

use cli_lib::MemStore;
use ledger::Ledger;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tomem_core::{BlobStore, MemoryBackend, WordListGenerator};

const WORDS: &[&str] = &[
    "butcheress", "oversteer", "lantern", "quasar", "marmalade", "ox", "fig", "zephyr",
    "harbinger", "tundra", "obsidian", "pelican", "saffron", "gantry", "velvet", "a",
];

/// A store over a fresh in-memory cache, plus a handle to poke the cache directly
pub fn memory_store() -> (Arc<MemoryBackend>, MemStore<MemoryBackend>) {
    memory_store_with_limit(tomem_core::DEFAULT_MAX_BLOB_BYTES)
}

pub fn memory_store_with_limit(
    max_blob_bytes: u64,
) -> (Arc<MemoryBackend>, MemStore<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let ids = WordListGenerator::from_words(WORDS.iter().copied())
        .with_rng(ChaCha8Rng::seed_from_u64(0x70_6d_65_6d));
    let ledger = Ledger::new(backend.clone(), ids);
    let blobs = BlobStore::new(backend.clone()).with_max_blob_bytes(max_blob_bytes);
    (backend, MemStore::new(ledger, blobs))
}

/// Deterministic pseudo-random payload
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill_bytes(&mut data);
    data
}

/// Temporary source and destination directories
pub struct Scratch {
    _root: TempDir,
    pub src: PathBuf,
    pub dest: PathBuf,
}

impl Scratch {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        let src = root.path().join("src");
        let dest = root.path().join("dest");
        std::fs::create_dir(&src).expect("Failed to create src dir");
        std::fs::create_dir(&dest).expect("Failed to create dest dir");
        Self {
            _root: root,
            src,
            dest,
        }
    }

    /// Write a source file and return its path
    pub fn file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.src.join(name);
        std::fs::write(&path, contents).expect("Failed to write source file");
        path
    }

    /// Files currently in the destination directory
    pub fn dest_entries(&self) -> Vec<String> {
        list_dir(&self.dest)
    }
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
