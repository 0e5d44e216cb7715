//! Tests for MetaResolver
//!
//! These tests verify:
//! - Lazy creation of the file record with size 0
//! - Cached fast path (no queries after the first resolution)
//! - Failed resolution leaves the cache empty and can be retried
//! - Concurrent first calls collapse into one resolution
//! - Recovery when another handle inserts the path first

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::thread;

use common::RecordingDatabase;
use sqlfile::db::schema::INSERT_FILE;
use sqlfile::db::{Database, Value};
use sqlfile::meta::{FileMeta, MetaResolver};
use sqlfile::SqlFileError;

// =============================================================================
// Resolution Tests
// =============================================================================

#[test]
fn test_resolve_creates_record() {
    let db = RecordingDatabase::new();
    let resolver = MetaResolver::new("test");

    let meta = resolver.resolve(db.as_ref()).unwrap();

    assert_eq!(meta.size, 0);
    assert_eq!(common::stored_size(db.as_ref(), "test"), Some(0));
    assert_eq!(db.count_matching("INSERT INTO files"), 1);
}

#[test]
fn test_resolve_finds_existing_record() {
    let db = RecordingDatabase::new();
    db.run(
        "INSERT INTO files (path, size) VALUES (?1, ?2)",
        &[Value::from("test"), Value::Integer(42)],
    )
    .unwrap();
    db.clear_log();

    let meta = MetaResolver::new("test").resolve(db.as_ref()).unwrap();

    assert_eq!(meta.size, 42);
    assert_eq!(db.count_matching("INSERT"), 0);
}

#[test]
fn test_second_resolve_uses_cache() {
    let db = RecordingDatabase::new();
    let resolver = MetaResolver::new("test");

    let first = resolver.resolve(db.as_ref()).unwrap();
    db.clear_log();
    let second = resolver.resolve(db.as_ref()).unwrap();

    assert_eq!(first, second);
    assert!(db.statements().is_empty());
    assert_eq!(resolver.cached(), Some(first));
}

#[test]
fn test_paths_get_distinct_ids() {
    let db = RecordingDatabase::new();

    let a = MetaResolver::new("a").resolve(db.as_ref()).unwrap();
    let b = MetaResolver::new("b").resolve(db.as_ref()).unwrap();

    assert_ne!(a.id, b.id);
}

#[test]
fn test_id_is_stable_across_resolvers() {
    let db = RecordingDatabase::new();

    let first = MetaResolver::new("test").resolve(db.as_ref()).unwrap();
    let second = MetaResolver::new("test").resolve(db.as_ref()).unwrap();

    assert_eq!(first.id, second.id);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_failed_lookup_leaves_cache_empty() {
    let db = RecordingDatabase::new();
    let resolver = MetaResolver::new("test");

    db.fail_next_gets(1);
    let result = resolver.resolve(db.as_ref());

    assert!(matches!(result, Err(SqlFileError::Db(_))));
    assert_eq!(resolver.cached(), None);

    // Retry succeeds
    let meta = resolver.resolve(db.as_ref()).unwrap();
    assert_eq!(meta.size, 0);
    assert_eq!(resolver.cached(), Some(meta));
}

#[test]
fn test_insert_race_falls_back_to_lookup() {
    let db = RecordingDatabase::new();
    let winner = MetaResolver::new("test").resolve(db.as_ref()).unwrap();

    // Second resolver misses the row on lookup, as if the winner inserted
    // it just after; its insert then changes nothing.
    db.hide_next_gets(1);
    let loser = MetaResolver::new("test").resolve(db.as_ref()).unwrap();

    assert_eq!(loser, winner);
    assert_eq!(db.count_matching("INSERT INTO files"), 2);
}

// =============================================================================
// Size Bookkeeping Tests
// =============================================================================

#[test]
fn test_update_size_only_grows() {
    let db = RecordingDatabase::new();
    let resolver = MetaResolver::new("test");
    let id = resolver.resolve(db.as_ref()).unwrap().id;

    resolver.update_size(600);
    assert_eq!(resolver.cached(), Some(FileMeta { id, size: 600 }));

    resolver.update_size(10);
    assert_eq!(resolver.cached(), Some(FileMeta { id, size: 600 }));
}

#[test]
fn test_update_size_without_cache_is_ignored() {
    let resolver = MetaResolver::new("test");
    resolver.update_size(600);
    assert_eq!(resolver.cached(), None);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_first_calls_resolve_once() {
    let db = RecordingDatabase::new();
    db.set_get_delay(20);
    let resolver = Arc::new(MetaResolver::new("test"));

    let mut handles = vec![];
    for _ in 0..8 {
        let db = Arc::clone(&db);
        let resolver = Arc::clone(&resolver);
        handles.push(thread::spawn(move || resolver.resolve(db.as_ref()).unwrap()));
    }
    let results: Vec<FileMeta> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(results.iter().all(|meta| *meta == results[0]));
    assert_eq!(db.count_matching("INSERT INTO files"), 1);
    assert_eq!(db.count_matching("SELECT id, size FROM files"), 1);

    let rows = db
        .all("SELECT id FROM files WHERE path = ?1", &[Value::from("test")])
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_insert_statement_is_idempotent() {
    let db = RecordingDatabase::new();
    db.run(INSERT_FILE, &[Value::from("test")]).unwrap();
    let again = db.run(INSERT_FILE, &[Value::from("test")]).unwrap();
    assert_eq!(again.changes, 0);
}
