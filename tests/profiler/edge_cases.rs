//! Edge Case Tests
//!
//! Tests for validation and degraded backends:
//! - oversized keys
//! - failed writes
//! - backend outages
//! - malformed index content

use crate::*;
use profiler_store::MAX_KEY_LENGTH;

fn oversized_token() -> String {
    "x".repeat(MAX_KEY_LENGTH)
}

/// Test oversized tokens fail on write before any backend call
#[test]
fn test_write_oversized_token() {
    test_across_backends(|profiler, backend| {
        let before = backend.op_count();
        let err = profiler.write(&Profile::new(oversized_token())).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(backend.op_count(), before);
    });
}

/// Test oversized tokens fail on read before any backend call
#[test]
fn test_read_oversized_token() {
    test_across_backends(|profiler, backend| {
        let before = backend.op_count();
        match profiler.read(&oversized_token()) {
            Err(Error::Configuration { length, max, .. }) => {
                assert_eq!(length, "sf_profiler_".len() + MAX_KEY_LENGTH);
                assert_eq!(max, MAX_KEY_LENGTH);
            }
            other => panic!("Expected Configuration error, got {:?}", other.map(|t| t.is_some())),
        }
        assert_eq!(backend.op_count(), before);
    });
}

/// Test the longest valid token still works
#[test]
fn test_longest_valid_token() {
    test_across_backends(|profiler, _| {
        let token = "y".repeat(MAX_KEY_LENGTH - "sf_profiler_".len());
        assert!(profiler.write(&Profile::new(token.clone())).unwrap());
        assert!(profiler.read(&token).unwrap().is_some());
    });
}

/// Test a rejected write returns false and leaves no trace
#[test]
fn test_rejected_write() {
    test_across_backends(|profiler, backend| {
        backend.set_fail_writes(true);
        assert!(!profiler.write(&Profile::new("abc")).unwrap());
        backend.set_fail_writes(false);

        assert!(profiler.read("abc").unwrap().is_none());
        assert!(profiler.find("", "", 10, "").unwrap().is_empty());
    });
}

/// Test an unavailable backend degrades to empty results
#[test]
fn test_unavailable_backend() {
    test_across_backends(|profiler, backend| {
        profiler.write(&Profile::new("abc")).unwrap();
        backend.set_unavailable(true);

        assert!(!profiler.write(&Profile::new("def")).unwrap());
        assert!(profiler.read("abc").unwrap().is_none());
        assert!(profiler.find("", "", 10, "").unwrap().is_empty());
        assert!(!profiler.purge().unwrap());
        assert_eq!(profiler.compact_index().unwrap(), None);

        backend.set_unavailable(false);
        assert!(profiler.read("abc").unwrap().is_some());
    });
}

/// Test corrupt index lines are skipped
#[test]
fn test_corrupt_index_lines_skipped() {
    test_across_backends(|profiler, backend| {
        profiler.write(&request("good1", "1.1.1.1", "GET", "/")).unwrap();
        backend
            .append("sf_profiler_index", b"not\tenough\tfields\n", Duration::ZERO)
            .unwrap();
        profiler.write(&request("good2", "1.1.1.1", "GET", "/")).unwrap();

        let found = profiler.find("", "", 10, "").unwrap();
        assert_eq!(tokens(&found), vec!["good1", "good2"]);
    });
}

/// Test a corrupt record reads as not found
#[test]
fn test_corrupt_record_reads_as_missing() {
    test_across_backends(|profiler, backend| {
        backend
            .set("sf_profiler_bad", b"\xc1garbage", Duration::ZERO)
            .unwrap();
        assert!(profiler.read("bad").unwrap().is_none());
    });
}

/// Test separators inside fields do not break the index
#[test]
fn test_separators_in_url() {
    test_across_backends(|profiler, _| {
        profiler
            .write(&request("tab", "1.1.1.1", "GET", "/a\tb\nc"))
            .unwrap();
        profiler.write(&request("next", "1.1.1.1", "GET", "/d")).unwrap();

        let found = profiler.find("", "", 10, "").unwrap();
        assert_eq!(tokens(&found), vec!["tab", "next"]);
        assert_eq!(found[0].url, "/a b c");

        // the record keeps the original url
        let tree = profiler.read("tab").unwrap().unwrap();
        assert_eq!(tree.root_profile().url, "/a\tb\nc");
    });
}

/// Test stored profiles expire with the configured lifetime
#[test]
fn test_profiles_expire() {
    init_tracing();
    let profiler = Profiler::builder()
        .lifetime(Duration::from_secs(1))
        .open()
        .unwrap();
    profiler.write(&Profile::new("short")).unwrap();
    assert!(profiler.read("short").unwrap().is_some());

    std::thread::sleep(Duration::from_millis(1100));
    assert!(profiler.read("short").unwrap().is_none());
    assert!(profiler.find("", "", 10, "").unwrap().is_empty());
}

/// Test the index token is refused and the index survives
#[test]
fn test_index_token_rejected() {
    test_across_backends(|profiler, backend| {
        profiler.write(&request("aaa", "1.1.1.1", "GET", "/a")).unwrap();
        profiler.write(&request("bbb", "1.1.1.1", "GET", "/b")).unwrap();

        let before = backend.op_count();
        let err = profiler
            .write(&request("index", "1.1.1.1", "GET", "/i"))
            .unwrap_err();
        assert!(err.is_invalid_token());
        assert!(matches!(profiler.read("index"), Err(Error::InvalidToken { .. })));
        assert_eq!(backend.op_count(), before);

        assert_eq!(tokens(&profiler.find("", "", 10, "").unwrap()), vec!["aaa", "bbb"]);
    });
}

/// Test tokens with separators are refused before any backend call
#[test]
fn test_separator_token_rejected() {
    test_across_backends(|profiler, backend| {
        let before = backend.op_count();
        for token in ["tab\there", "line\nbreak", "carriage\rreturn"] {
            let err = profiler.write(&Profile::new(token)).unwrap_err();
            assert!(err.is_invalid_token());
        }
        assert_eq!(backend.op_count(), before);
        assert!(profiler.find("", "", 10, "").unwrap().is_empty());
    });
}
