//! Purge Tests
//!
//! Tests for removing stored profiles:
//! - every written token becomes unreadable
//! - prefix-scoped purge keeps foreign keys
//! - flush fallback for backends without key enumeration

use crate::*;

/// Test purge removes every written profile and the index
#[test]
fn test_purge_removes_everything_written() {
    test_across_backends(|profiler, _| {
        let tokens_written: Vec<String> = (0..10).map(|i| format!("p{}", i)).collect();
        for token in &tokens_written {
            profiler.write(&Profile::new(token.clone())).unwrap();
        }

        assert!(profiler.purge().unwrap());

        for token in &tokens_written {
            assert!(profiler.read(token).unwrap().is_none());
        }
        assert!(profiler.find("", "", 100, "").unwrap().is_empty());
    });
}

/// Test the store is usable after purge
#[test]
fn test_write_after_purge() {
    test_across_backends(|profiler, _| {
        profiler.write(&Profile::new("old")).unwrap();
        profiler.purge().unwrap();
        profiler.write(&Profile::new("new")).unwrap();

        assert_eq!(tokens(&profiler.find("", "", 10, "").unwrap()), vec!["new"]);
    });
}

/// Test purge only touches this store's prefix when the backend allows it
#[test]
fn test_scoped_purge_keeps_foreign_keys() {
    init_tracing();
    let backend = Arc::new(MemoryBackend::new());
    let ours = Profiler::builder().backend(backend.clone()).open().unwrap();
    let theirs = Profiler::builder()
        .backend(backend.clone())
        .prefix("other_app_")
        .open()
        .unwrap();

    ours.write(&Profile::new("mine")).unwrap();
    theirs.write(&Profile::new("yours")).unwrap();

    assert!(ours.purge().unwrap());
    assert!(ours.read("mine").unwrap().is_none());
    assert!(theirs.read("yours").unwrap().is_some());
    assert_eq!(tokens(&theirs.find("", "", 10, "").unwrap()), vec!["yours"]);
}

/// Test purge flushes everything when prefix delete is unavailable
#[test]
fn test_flush_fallback_clears_backend() {
    init_tracing();
    let backend = Arc::new(MemoryBackend::without_prefix_delete());
    let ours = Profiler::builder().backend(backend.clone()).open().unwrap();
    let theirs = Profiler::builder()
        .backend(backend.clone())
        .prefix("other_app_")
        .open()
        .unwrap();

    ours.write(&Profile::new("mine")).unwrap();
    theirs.write(&Profile::new("yours")).unwrap();

    assert!(ours.purge().unwrap());
    assert!(theirs.read("yours").unwrap().is_none());
    assert!(backend.is_empty());
}
