//! Session and dedup store tests: atomic claim under threads, persistence
//! across reopen, and the append-text backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sharecrawl::store::{DedupStore, SessionStore};
use sharecrawl::types::SessionBackend;

#[test]
fn test_claim_is_insert_if_absent() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::open(&dir.path().join("s.db"), SessionBackend::Sqlite).unwrap();

    assert!(store.claim("a/b.txt").unwrap());
    assert!(!store.claim("a/b.txt").unwrap());
    assert!(store.contains("a/b.txt").unwrap());
    assert!(!store.contains("a/c.txt").unwrap());
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_claims_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.db");
    {
        let store = SessionStore::open(&path, SessionBackend::Sqlite).unwrap();
        assert!(store.claim("x").unwrap());
    }
    let store = SessionStore::open(&path, SessionBackend::Sqlite).unwrap();
    assert!(!store.claim("x").unwrap());
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_concurrent_claims_grant_exactly_one_winner_per_key() {
    let dir = tempfile::tempdir().unwrap();
    let store =
        Arc::new(SessionStore::open(&dir.path().join("s.db"), SessionBackend::Sqlite).unwrap());
    let wins = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let wins = &wins;
            scope.spawn(move || {
                for key in 0..100 {
                    if store.claim(&format!("file-{key}")).unwrap() {
                        wins.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    // 8 threads raced over 100 keys; each key has exactly one winner.
    assert_eq!(wins.load(Ordering::Relaxed), 100);
    assert_eq!(store.count().unwrap(), 100);
}

#[test]
fn test_dedup_first_sighting_wins() {
    let dir = tempfile::tempdir().unwrap();
    let store = DedupStore::open(&dir.path().join("d.db")).unwrap();

    assert!(store.claim("deadbeef", "a.txt").unwrap());
    assert!(!store.claim("deadbeef", "b.txt").unwrap());
    assert!(store.contains("deadbeef").unwrap());
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_append_text_backend_claims_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.txt");
    {
        let store = SessionStore::open(&path, SessionBackend::AppendText).unwrap();
        assert!(store.claim("one").unwrap());
        assert!(store.claim("two").unwrap());
        assert!(!store.claim("one").unwrap());
        assert_eq!(store.count().unwrap(), 2);
    }
    let store = SessionStore::open(&path, SessionBackend::AppendText).unwrap();
    assert!(!store.claim("two").unwrap());
    assert!(store.claim("three").unwrap());
    assert_eq!(store.count().unwrap(), 3);
}
