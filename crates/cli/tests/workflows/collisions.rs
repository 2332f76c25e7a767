//! Last-write-wins on custom identifiers
//!
//! These tests document the accepted gap: a reused identifier silently
//! replaces the earlier record, and the earlier file is no longer reachable.

use crate::common::{memory_store, Scratch};
use tomem_core::StoreError;

#[test]
fn test_same_custom_identifier_keeps_second_file() {
    let scratch = Scratch::new();
    let (backend, store) = memory_store();
    let first = scratch.file("first.txt", b"first contents");
    let second = scratch.file("second.txt", b"second!");

    store.store_file(&first, Some("shared")).unwrap();
    store.store_file(&second, Some("shared")).unwrap();

    let files = store.stored_files().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files["shared"].name, "second.txt");
    assert_eq!(files["shared"].size, 7);

    // The blob key is the identifier, so the first blob was replaced too
    let blob = tomem_core::CacheBackend::get(&*backend, "shared").unwrap();
    assert_eq!(blob.unwrap(), b"second!");

    store.retrieve_file("shared", Some(&scratch.dest)).unwrap();
    assert_eq!(scratch.dest_entries(), vec!["second.txt".to_string()]);
    assert_eq!(
        std::fs::read(scratch.dest.join("second.txt")).unwrap(),
        b"second!"
    );
}

#[test]
fn test_retrieval_is_one_shot_per_identifier() {
    let scratch = Scratch::new();
    let (_, store) = memory_store();
    let src = scratch.file("once.txt", b"once");

    let (id, _) = store.store_file(&src, Some("once")).unwrap();
    store.retrieve_file(&id, Some(&scratch.dest)).unwrap();

    let second_dest = scratch.dest.join("again.txt");
    assert!(matches!(
        store.retrieve_file(&id, Some(&second_dest)),
        Err(StoreError::NotFound(_))
    ));
    assert!(!second_dest.exists());
}

#[test]
fn test_identifiers_are_independent() {
    let scratch = Scratch::new();
    let (_, store) = memory_store();
    let a = scratch.file("a.txt", b"aaaa");
    let b = scratch.file("b.txt", b"bbbb");

    store.store_file(&a, Some("alpha")).unwrap();
    store.store_file(&b, Some("bravo")).unwrap();
    store.retrieve_file("alpha", Some(&scratch.dest)).unwrap();

    let remaining = store.list_files().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining["bravo"], "b.txt");
}
