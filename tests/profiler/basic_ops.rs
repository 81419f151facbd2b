//! Basic Operation Tests
//!
//! Tests for write and read:
//! - round trip of metadata and collector payload
//! - missing tokens
//! - rewrites

use crate::*;

/// Test write then read returns identical metadata and payload
#[test]
fn test_write_read_round_trip() {
    test_across_backends(|profiler, _| {
        let written = request("a1b2c3", "10.0.0.1", "POST", "https://shop.test/cart")
            .with_collector_data(json!({
                "request": {"status_code": 201, "format": "html"},
                "time": {"duration": 38.25},
                "logger": {"errors": 0, "messages": ["booted", "handled"]},
                "memory": null
            }));
        assert!(profiler.write(&written).unwrap());

        let tree = profiler.read("a1b2c3").unwrap().unwrap();
        let read = tree.root_profile();
        assert_eq!(read.token, written.token);
        assert_eq!(read.ip, written.ip);
        assert_eq!(read.method, written.method);
        assert_eq!(read.url, written.url);
        assert_eq!(read.time, written.time);
        assert_eq!(read.collector_data, written.collector_data);
    });
}

/// Test round trip across many tokens
#[test]
fn test_round_trip_many_tokens() {
    test_across_backends(|profiler, _| {
        for i in 0..50 {
            let token = format!("tok{:03}", i);
            let profile = request(&token, "127.0.0.1", "GET", &format!("/item/{}", i))
                .with_time(1_700_000_000 + i)
                .with_collector_data(json!({ "i": i }));
            assert!(profiler.write(&profile).unwrap());
        }

        for i in 0..50 {
            let token = format!("tok{:03}", i);
            let tree = profiler.read(&token).unwrap().unwrap();
            assert_eq!(tree.root_profile().url, format!("/item/{}", i));
            assert_eq!(tree.root_profile().time, 1_700_000_000 + i);
            assert_eq!(tree.root_profile().collector_data, json!({ "i": i }));
        }
    });
}

/// Test reading an unknown token
#[test]
fn test_read_unknown_token() {
    test_across_backends(|profiler, _| {
        assert!(profiler.read("missing").unwrap().is_none());
    });
}

/// Test reading the empty token never reaches the backend
#[test]
fn test_read_empty_token() {
    test_across_backends(|profiler, backend| {
        let before = backend.op_count();
        assert!(profiler.read("").unwrap().is_none());
        assert_eq!(backend.op_count(), before);
    });
}

/// Test rewriting a token replaces the stored record
#[test]
fn test_rewrite_replaces_record() {
    test_across_backends(|profiler, _| {
        profiler.write(&request("abc", "1.1.1.1", "GET", "/first")).unwrap();
        profiler.write(&request("abc", "2.2.2.2", "PUT", "/second")).unwrap();

        let tree = profiler.read("abc").unwrap().unwrap();
        assert_eq!(tree.root_profile().ip, "2.2.2.2");
        assert_eq!(tree.root_profile().url, "/second");
    });
}

/// Test generated tokens can be stored and read
#[test]
fn test_generated_token() {
    test_across_backends(|profiler, _| {
        let token = Profile::generate_token();
        profiler.write(&Profile::new(token.clone())).unwrap();
        assert!(profiler.read(&token).unwrap().is_some());
    });
}
