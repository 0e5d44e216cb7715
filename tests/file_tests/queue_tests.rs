//! Tests for the write queue
//!
//! These tests verify:
//! - Writes apply in submission order even when queued back-to-back
//! - A failed write is reported on its ticket and the queue moves on
//! - flush / close / drop drain everything already queued
//! - Reads racing writes see whole writes, never a mix
//! - Idle/Writing state and pending counters

#[path = "../common/mod.rs"]
mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{apply_to_model, RecordingDatabase};
use sqlfile::{Config, SqlFile, SqlFileError, WriteTicket};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_file() -> (Arc<RecordingDatabase>, SqlFile) {
    let db = RecordingDatabase::new();
    let file = SqlFile::new(db.clone(), "queue").unwrap();
    (db, file)
}

fn wait_all(tickets: Vec<WriteTicket>) {
    for ticket in tickets {
        ticket.wait().unwrap();
    }
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_back_to_back_writes_apply_in_order() {
    let (db, file) = setup_file();
    // Slow batches so later writes are queued while earlier ones run
    db.set_batch_delay(20);

    let tickets = vec![
        file.write(0, vec![0xAA; 600]).unwrap(),
        file.write(100, vec![0xBB; 50]).unwrap(),
        file.write(590, vec![0xCC; 20]).unwrap(),
        file.write(120, vec![0xDD; 5]).unwrap(),
    ];
    wait_all(tickets);

    let mut model = Vec::new();
    apply_to_model(&mut model, 0, &[0xAA; 600]);
    apply_to_model(&mut model, 100, &[0xBB; 50]);
    apply_to_model(&mut model, 590, &[0xCC; 20]);
    apply_to_model(&mut model, 120, &[0xDD; 5]);

    assert_eq!(file.len().unwrap(), 610);
    assert_eq!(file.read(0, 610).unwrap(), model);
}

#[test]
fn test_many_queued_writes_match_sequential_model() {
    let (_db, file) = setup_file();
    let mut model = Vec::new();
    let mut tickets = Vec::new();

    for i in 0..200usize {
        let offset = (i * 97) % 3000;
        let len = 1 + (i * 13) % 700;
        let data = vec![i as u8; len];
        apply_to_model(&mut model, offset, &data);
        tickets.push(file.write(offset as u64, data).unwrap());
    }
    wait_all(tickets);

    assert_eq!(file.len().unwrap(), model.len() as u64);
    assert_eq!(file.read(0, model.len() as u64).unwrap(), model);
}

#[test]
fn test_same_region_last_write_wins() {
    let (db, file) = setup_file();
    db.set_batch_delay(5);

    let tickets: Vec<WriteTicket> = (0..10u8)
        .map(|i| file.write(0, vec![i; 512]).unwrap())
        .collect();
    wait_all(tickets);

    assert_eq!(&file.read(0, 512).unwrap()[..], &[9u8; 512][..]);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_failed_write_does_not_stop_queue() {
    let (db, file) = setup_file();
    db.fail_next_batches(1);

    let first = file.write(0, vec![0xAA; 10]).unwrap();
    let second = file.write(0, vec![0xBB; 5]).unwrap();

    assert!(matches!(first.wait(), Err(SqlFileError::Db(_))));
    second.wait().unwrap();

    assert_eq!(file.len().unwrap(), 5);
    assert_eq!(&file.read(0, 5).unwrap()[..], &[0xBB; 5][..]);
}

#[test]
fn test_failed_write_leaves_size_unchanged() {
    let (db, file) = setup_file();
    file.write_all(0, vec![1u8; 100]).unwrap();

    db.fail_next_batches(1);
    let result = file.write_all(0, vec![2u8; 2000]);

    assert!(matches!(result, Err(SqlFileError::Db(_))));
    assert_eq!(file.len().unwrap(), 100);
    assert_eq!(common::stored_size(db.as_ref(), "queue"), Some(100));
    assert_eq!(&file.read(0, 100).unwrap()[..], &[1u8; 100][..]);
}

#[test]
fn test_failed_resolution_is_reported_on_ticket() {
    let (db, file) = setup_file();
    db.fail_next_gets(1);

    let result = file.write_all(0, vec![1u8; 10]);
    assert!(matches!(result, Err(SqlFileError::Db(_))));

    file.write_all(0, vec![1u8; 10]).unwrap();
    assert_eq!(file.len().unwrap(), 10);
}

// =============================================================================
// Drain Tests
// =============================================================================

#[test]
fn test_flush_waits_for_queued_writes() {
    let (db, file) = setup_file();
    db.set_batch_delay(10);

    for i in 0..5u64 {
        let _ = file.write(i * 10, vec![1u8; 10]).unwrap();
    }
    file.flush().unwrap();

    assert_eq!(file.pending_writes(), 0);
    assert!(!file.is_writing());
    assert_eq!(file.len().unwrap(), 50);
}

#[test]
fn test_close_drains_queue() {
    let (db, file) = setup_file();
    db.set_batch_delay(10);

    for i in 0..5u64 {
        let _ = file.write(i * 100, vec![2u8; 100]).unwrap();
    }
    file.close().unwrap();

    let reopened = SqlFile::new(db.clone(), "queue").unwrap();
    assert_eq!(reopened.len().unwrap(), 500);
    assert_eq!(&reopened.read(0, 500).unwrap()[..], &[2u8; 500][..]);
}

#[test]
fn test_drop_drains_queue() {
    let db = RecordingDatabase::new();
    db.set_batch_delay(10);
    {
        let file = SqlFile::new(db.clone(), "queue").unwrap();
        let _ = file.write(0, vec![3u8; 700]).unwrap();
        let _ = file.write(700, vec![4u8; 300]).unwrap();
    }

    let file = SqlFile::new(db.clone(), "queue").unwrap();
    assert_eq!(file.len().unwrap(), 1000);
    assert_eq!(&file.read(700, 300).unwrap()[..], &[4u8; 300][..]);
}

#[test]
fn test_ticket_outlives_handle() {
    let db = RecordingDatabase::new();
    let ticket = {
        let file = SqlFile::new(db.clone(), "queue").unwrap();
        file.write(0, vec![1u8; 10]).unwrap()
    };

    // The handle drained the write on drop, so the result is waiting
    assert!(matches!(ticket.try_wait(), Some(Ok(()))));
}

// =============================================================================
// State Tests
// =============================================================================

#[test]
fn test_pending_and_writing_state() {
    let (db, file) = setup_file();
    db.set_batch_delay(100);

    let first = file.write(0, vec![1u8; 10]).unwrap();
    let second = file.write(10, vec![1u8; 10]).unwrap();
    assert_eq!(file.pending_writes(), 2);

    // Wait until the worker picks up the first write
    let deadline = Instant::now() + Duration::from_secs(5);
    while !file.is_writing() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    assert!(file.is_writing());
    assert!(second.try_wait().is_none());

    first.wait().unwrap();
    second.wait().unwrap();
    assert_eq!(file.pending_writes(), 0);
    assert!(!file.is_writing());
}

#[test]
fn test_bounded_queue_applies_everything() {
    let db = RecordingDatabase::new();
    db.set_batch_delay(2);
    let config = Config::builder().write_queue_capacity(1).build();
    let file = SqlFile::with_config(db.clone(), "queue", &config).unwrap();

    let tickets: Vec<WriteTicket> = (0..10u64)
        .map(|i| file.write(i * 512, vec![i as u8; 512]).unwrap())
        .collect();
    wait_all(tickets);

    assert_eq!(file.len().unwrap(), 5120);
    assert_eq!(&file.read(9 * 512, 512).unwrap()[..], &[9u8; 512][..]);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_reads_racing_writes_see_whole_writes() {
    let db = RecordingDatabase::new();
    let file = Arc::new(SqlFile::new(db.clone(), "queue").unwrap());
    file.write_all(0, vec![0u8; 1024]).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let mut readers = vec![];
    for _ in 0..4 {
        let file = Arc::clone(&file);
        let done = Arc::clone(&done);
        readers.push(thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                let bytes = file.read(0, 1024).unwrap();
                let first = bytes[0];
                assert!(bytes.iter().all(|&b| b == first), "torn read");
            }
        }));
    }

    let tickets: Vec<WriteTicket> = (1..=50u8)
        .map(|i| file.write(0, vec![i; 1024]).unwrap())
        .collect();
    wait_all(tickets);
    done.store(true, Ordering::SeqCst);

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(&file.read(0, 1024).unwrap()[..], &[50u8; 1024][..]);
}

#[test]
fn test_files_write_concurrently() {
    let db = RecordingDatabase::new();

    let mut handles = vec![];
    for t in 0..4u8 {
        let db = db.clone();
        handles.push(thread::spawn(move || {
            let file = SqlFile::new(db, format!("file-{}", t)).unwrap();
            for i in 0..20u64 {
                file.write_all(i * 100, vec![t; 100]).unwrap();
            }
            file.len().unwrap()
        }));
    }

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2000);
    }
}
