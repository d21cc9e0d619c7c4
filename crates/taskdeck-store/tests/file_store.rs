//! Reopen and corruption behavior of the file-backed store.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;

use taskdeck_store::{FileStore, KeyValueStore, StorageScope, StoreError};
use tempfile::TempDir;

#[test]
fn values_survive_reopen() {
    let dir = TempDir::with_prefix("taskdeck-store-").expect("create temp dir");
    let path = dir.path().join(StorageScope::Persistent.file_name());

    {
        let store = FileStore::open(&path).expect("open store");
        store.set("tasks", "[]").expect("set tasks");
        store.set("other", "1").expect("set other");
        store.remove("other").expect("remove other");
    }

    let reopened = FileStore::open(&path).expect("reopen store");
    assert_eq!(reopened.get("tasks").expect("get").as_deref(), Some("[]"));
    assert_eq!(reopened.get("other").expect("get"), None);
}

#[test]
fn corrupt_file_is_reported() {
    let dir = TempDir::with_prefix("taskdeck-store-").expect("create temp dir");
    let path = dir.path().join(StorageScope::Session.file_name());
    fs::write(&path, "{ not json").expect("write garbage");

    let err = FileStore::open(&path).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }), "unexpected error: {err}");
    assert!(err.to_string().contains("session.json"));
}

#[test]
fn corrupt_file_can_be_opened_empty_and_is_replaced_on_write() {
    let dir = TempDir::with_prefix("taskdeck-store-").expect("create temp dir");
    let path = dir.path().join(StorageScope::Persistent.file_name());
    fs::write(&path, "{ not json").expect("write garbage");

    let store = FileStore::open_or_empty(&path).expect("open despite corruption");
    assert_eq!(store.get("tasks").expect("get"), None);
    assert_eq!(fs::read_to_string(&path).expect("read"), "{ not json");

    store.set("tasks", "[]").expect("set");
    let reopened = FileStore::open(&path).expect("file is valid again");
    assert_eq!(reopened.get("tasks").expect("get").as_deref(), Some("[]"));
}

#[test]
fn open_or_empty_keeps_valid_contents() {
    let dir = TempDir::with_prefix("taskdeck-store-").expect("create temp dir");
    let path = dir.path().join(StorageScope::Session.file_name());
    FileStore::open(&path)
        .expect("open")
        .set("isAuthenticated", "true")
        .expect("set");

    let store = FileStore::open_or_empty(&path).expect("open");
    assert_eq!(store.get("isAuthenticated").expect("get").as_deref(), Some("true"));
}

#[test]
fn non_string_values_are_treated_as_corrupt() {
    let dir = TempDir::with_prefix("taskdeck-store-").expect("create temp dir");
    let path = dir.path().join("store.json");
    fs::write(&path, r#"{"isAuthenticated": true}"#).expect("write");

    assert!(matches!(
        FileStore::open(&path),
        Err(StoreError::Corrupt { .. })
    ));
}

#[test]
fn independent_scopes_do_not_share_keys() {
    let dir = TempDir::with_prefix("taskdeck-store-").expect("create temp dir");
    let session = FileStore::open(dir.path().join(StorageScope::Session.file_name()))
        .expect("open session");
    let persistent = FileStore::open(dir.path().join(StorageScope::Persistent.file_name()))
        .expect("open persistent");

    session.set("isAuthenticated", "true").expect("set");
    assert_eq!(persistent.get("isAuthenticated").expect("get"), None);
}
