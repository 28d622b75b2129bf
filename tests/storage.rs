//! Blob backend contract tests against the local-disk implementation.

use bucketd::storage::{BlobBackend, BlobError, LocalBlobStore};
use bytes::Bytes;
use tempfile::tempdir;

#[tokio::test]
async fn put_get_roundtrip() {
    let dir = tempdir().unwrap();
    let store = LocalBlobStore::new(dir.path());

    let locator = store
        .put("ns", "key.txt", Bytes::from_static(b"hello"), "text/plain")
        .await
        .unwrap();
    let bytes = store.get(&locator).await.unwrap();
    assert_eq!(&bytes[..], b"hello");
}

#[tokio::test]
async fn get_of_unknown_locator_is_not_found() {
    let dir = tempdir().unwrap();
    let store = LocalBlobStore::new(dir.path());

    let missing = dir.path().join("ns/absent.txt");
    let err = store.get(missing.to_str().unwrap()).await.unwrap_err();
    assert!(matches!(err, BlobError::NotFound(_)));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let dir = tempdir().unwrap();
    let store = LocalBlobStore::new(dir.path());

    let locator = store
        .put("ns", "key.txt", Bytes::from_static(b"x"), "text/plain")
        .await
        .unwrap();

    assert!(store.delete(&locator).await.unwrap());
    assert!(!store.delete(&locator).await.unwrap());
    assert!(!store.exists(&locator).await.unwrap());
}

#[tokio::test]
async fn put_leaves_no_temp_files_behind() {
    let dir = tempdir().unwrap();
    let store = LocalBlobStore::new(dir.path());

    store
        .put("ns", "key.txt", Bytes::from_static(b"x"), "text/plain")
        .await
        .unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("ns"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn rename_moves_between_namespaces() {
    let dir = tempdir().unwrap();
    let store = LocalBlobStore::new(dir.path());

    let locator = store
        .put("src", "key.txt", Bytes::from_static(b"move me"), "text/plain")
        .await
        .unwrap();

    let new_locator = store
        .rename(&locator, "dst", "key.txt", "text/plain")
        .await
        .unwrap();
    assert_ne!(locator, new_locator);
    assert!(!store.exists(&locator).await.unwrap());

    let bytes = store.get(&new_locator).await.unwrap();
    assert_eq!(&bytes[..], b"move me");
}

#[tokio::test]
async fn rename_of_missing_object_fails_cleanly() {
    let dir = tempdir().unwrap();
    let store = LocalBlobStore::new(dir.path());

    let missing = dir.path().join("src/absent.txt");
    let err = store
        .rename(missing.to_str().unwrap(), "dst", "key.txt", "text/plain")
        .await
        .unwrap_err();
    assert!(matches!(err, BlobError::NotFound(_)));
}
