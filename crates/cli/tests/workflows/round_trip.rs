//! Store then retrieve

use crate::common::{memory_store, random_bytes, Scratch};
use tomem_core::{digest, StoreError};

#[test]
fn test_round_trip_is_byte_identical() {
    let scratch = Scratch::new();
    let (backend, store) = memory_store();

    let data = random_bytes(70_000, 1);
    let src = scratch.file("cat.png", &data);

    let (id, record) = store.store_file(&src, None).unwrap();
    assert_eq!(record.name, "cat.png");
    assert_eq!(record.size, data.len() as u64);
    assert_eq!(record.checksum, digest(&data).to_hex());
    assert!(backend.contains(&id));

    let (path, got) = store.retrieve_file(&id, Some(&scratch.dest)).unwrap();
    assert_eq!(got, record);
    assert_eq!(path, scratch.dest.join("cat.png"));
    assert_eq!(std::fs::read(scratch.dest.join("cat.png")).unwrap(), data);

    // Pickup is one-shot
    assert!(!backend.contains(&id));
    assert!(store.list_files().unwrap().is_empty());
    assert!(matches!(
        store.retrieve_file(&id, Some(&scratch.dest)),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn test_round_trip_with_custom_identifier() {
    let scratch = Scratch::new();
    let (_, store) = memory_store();
    let src = scratch.file("data.bin", b"\x00\x01\x02binary\xff");

    let (id, _) = store.store_file(&src, Some("customid")).unwrap();
    assert_eq!(id, "customid");
    assert_eq!(store.list_files().unwrap()["customid"], "data.bin");

    store.retrieve_file("customid", Some(&scratch.dest)).unwrap();
    assert_eq!(
        std::fs::read(scratch.dest.join("data.bin")).unwrap(),
        b"\x00\x01\x02binary\xff"
    );
}

#[test]
fn test_generated_identifiers_meet_minimum_length() {
    let scratch = Scratch::new();
    let (_, store) = memory_store();

    for i in 0..10 {
        let src = scratch.file(&format!("f{}.txt", i), format!("file {}", i).as_bytes());
        let (id, _) = store.store_file(&src, None).unwrap();
        assert!(id.chars().count() >= 4, "identifier too short: {}", id);
        assert_eq!(id, id.to_lowercase());
    }
}

#[test]
fn test_retrieve_to_new_file_path() {
    let scratch = Scratch::new();
    let (_, store) = memory_store();
    let src = scratch.file("report.xls", b"cells");

    let (id, _) = store.store_file(&src, None).unwrap();
    let target = scratch.dest.join("renamed.xls");
    let (path, _) = store.retrieve_file(&id, Some(&target)).unwrap();

    assert_eq!(path, target);
    assert_eq!(std::fs::read(&target).unwrap(), b"cells");
    assert_eq!(scratch.dest_entries(), vec!["renamed.xls".to_string()]);
}

#[test]
fn test_empty_file_round_trip() {
    let scratch = Scratch::new();
    let (_, store) = memory_store();
    let src = scratch.file("empty", b"");

    let (id, record) = store.store_file(&src, None).unwrap();
    assert_eq!(record.size, 0);

    store.retrieve_file(&id, Some(&scratch.dest)).unwrap();
    assert_eq!(std::fs::read(scratch.dest.join("empty")).unwrap(), b"");
}

#[test]
fn test_stored_files_reports_metadata() {
    let scratch = Scratch::new();
    let (_, store) = memory_store();
    let src = scratch.file("notes.md", b"# notes");

    let (id, record) = store.store_file(&src, Some("notes")).unwrap();
    let files = store.stored_files().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[&id], record);
}
