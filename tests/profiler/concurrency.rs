//! Concurrency Tests
//!
//! Tests for writers sharing one backend from several threads.

use crate::*;
use std::thread;

/// Test concurrent writers each get exactly one index entry per token
#[test]
fn test_concurrent_writers() {
    init_tracing();
    let profiler = Arc::new(Profiler::ephemeral().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let profiler = Arc::clone(&profiler);
            thread::spawn(move || {
                for i in 0..25 {
                    let token = format!("w{}n{:02}", t, i);
                    let profile = request(&token, &format!("10.0.0.{}", t), "GET", "/");
                    assert!(profiler.write(&profile).unwrap());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let found = profiler.find("", "", 1000, "").unwrap();
    assert_eq!(found.len(), 100);

    let from_two = profiler.find("10.0.0.2", "", 1000, "").unwrap();
    assert_eq!(from_two.len(), 25);
    assert!(from_two.iter().all(|s| s.token.starts_with("w2")));
}

/// Test readers see complete profiles while writers are active
#[test]
fn test_concurrent_reads_and_writes() {
    init_tracing();
    let profiler = Arc::new(Profiler::ephemeral().unwrap());
    profiler
        .write(&request("stable", "1.1.1.1", "GET", "/").with_collector_data(json!({"n": 1})))
        .unwrap();

    let writer = {
        let profiler = Arc::clone(&profiler);
        thread::spawn(move || {
            for i in 0..50 {
                profiler.write(&Profile::new(format!("bg{}", i))).unwrap();
            }
        })
    };
    for _ in 0..50 {
        let tree = profiler.read("stable").unwrap().unwrap();
        assert_eq!(tree.root_profile().collector_data, json!({"n": 1}));
    }
    writer.join().unwrap();
}
