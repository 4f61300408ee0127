mod common;

use client::history::Origin;
use client::storage::HISTORY_KEY;
use client::{DeleteOutcome, HistoryReconciler, KeyValueStore, LocalHistoryCache, MemoryStore};
use common::*;
use futures::executor::block_on;
use shared::AnalysisRecord;
use std::cell::Cell;

fn reconciler(backend: FakeBackend, store: &MemoryStore) -> HistoryReconciler<FakeBackend, MemoryStore> {
    init_logging();
    HistoryReconciler::new(backend, LocalHistoryCache::new(store.clone(), HISTORY_KEY, 10))
}

fn cached(store: &MemoryStore) -> Vec<AnalysisRecord> {
    serde_json::from_str(&store.get(HISTORY_KEY).unwrap_or_else(|| "[]".into())).unwrap()
}

#[test]
fn remote_load_keeps_server_order_and_refreshes_cache() {
    let store = MemoryStore::new();
    let backend = FakeBackend::with_records(vec![
        record("a", 1, &[("joy", 0.4)]),
        record("b", 5, &[("anger", 0.7)]),
        record("c", 3, &[("fear", 0.2)]),
    ]);
    let history = reconciler(backend, &store);

    let ids: Vec<_> = block_on(history.load()).into_iter().map(|r| r.id).collect();
    assert_eq!(ids, ["a", "b", "c"]);
    let cached_ids: Vec<_> = cached(&store).into_iter().map(|r| r.id).collect();
    assert_eq!(cached_ids, ids);
}

#[test]
fn load_is_idempotent() {
    let store = MemoryStore::new();
    let backend = FakeBackend::with_records(vec![record("a", 2, &[("joy", 0.4)])]);
    let history = reconciler(backend, &store);

    let first = block_on(history.load());
    let second = block_on(history.load());
    assert_eq!(first, second);
    assert_eq!(history.records(), second);
}

#[test]
fn offline_load_reads_back_what_local_upsert_wrote() {
    let store = MemoryStore::new();
    let backend = FakeBackend::default();
    backend.state.fetch_fails.set(true);

    let written = record("1714557600000", 3, &[("sadness", 0.6)]);
    reconciler(backend.clone(), &store).upsert_newest(written.clone(), Origin::Local);

    let fresh = reconciler(backend, &store);
    assert_eq!(block_on(fresh.load()), vec![written]);
}

#[test]
fn offline_load_keeps_upsert_order_despite_clock_skew() {
    let store = MemoryStore::new();
    let backend = FakeBackend::default();
    let writer = reconciler(backend.clone(), &store);
    writer.upsert_newest(record("srv", 9, &[("joy", 0.8)]), Origin::Remote);
    // Client clock behind the server's.
    writer.upsert_newest(record("1714557600000", 3, &[("fear", 0.5)]), Origin::Local);
    let written: Vec<_> = writer.records().into_iter().map(|r| r.id).collect();
    assert_eq!(written, ["1714557600000", "srv"]);

    backend.state.fetch_fails.set(true);
    let fresh = reconciler(backend, &store);
    let read: Vec<_> = block_on(fresh.load()).into_iter().map(|r| r.id).collect();
    assert_eq!(read, written);
}

#[test]
fn offline_load_without_cache_is_empty() {
    let store = MemoryStore::new();
    let backend = FakeBackend::default();
    backend.state.fetch_fails.set(true);
    let history = reconciler(backend, &store);

    assert!(block_on(history.load()).is_empty());
}

#[test]
fn corrupt_cache_counts_as_empty() {
    let store = MemoryStore::new();
    store.set(HISTORY_KEY, "{not json").unwrap();
    let backend = FakeBackend::default();
    backend.state.fetch_fails.set(true);

    assert!(block_on(reconciler(backend, &store).load()).is_empty());
}

#[test]
fn remote_upsert_does_not_write_cache() {
    let store = MemoryStore::new();
    let history = reconciler(FakeBackend::default(), &store);
    history.upsert_newest(record("srv-1", 0, &[("joy", 0.5)]), Origin::Remote);

    assert_eq!(history.records().len(), 1);
    assert!(store.get(HISTORY_KEY).is_none());
}

#[test]
fn upsert_replaces_record_with_same_id() {
    let store = MemoryStore::new();
    let history = reconciler(FakeBackend::default(), &store);
    history.upsert_newest(record("x", 0, &[("joy", 0.5)]), Origin::Local);
    history.upsert_newest(record("y", 1, &[("joy", 0.5)]), Origin::Local);
    history.upsert_newest(record("x", 2, &[("fear", 0.9)]), Origin::Local);

    let ids: Vec<_> = history.records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, ["x", "y"]);
    assert_eq!(history.records()[0].dominant_emotion, "fear");
}

#[test]
fn delete_removes_locally_even_when_remote_fails() {
    let store = MemoryStore::new();
    let backend = FakeBackend::with_records(vec![
        record("keep", 1, &[("joy", 0.4)]),
        record("drop", 2, &[("anger", 0.7)]),
    ]);
    backend.state.delete_fails.set(true);
    let history = reconciler(backend.clone(), &store);
    block_on(history.load());
    let shown = block_on(history.select("drop")).unwrap();
    assert_eq!(history.displayed(), Some(shown));

    let asked = Cell::new(None);
    let outcome = block_on(history.delete("drop", &|prompt: &str| {
        asked.set(Some(prompt.to_string()));
        true
    }));

    let DeleteOutcome::Removed {
        cleared_display,
        remote_error,
    } = outcome
    else {
        panic!("expected removal, got {:?}", outcome);
    };
    assert!(cleared_display);
    assert!(remote_error.is_some());
    assert_eq!(asked.take().as_deref(), Some(client::history::DELETE_PROMPT));
    assert_eq!(history.displayed(), None);

    let ids: Vec<_> = history.records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, ["keep"]);
    assert_eq!(cached(&store).len(), 1);
    assert_eq!(backend.state.deleted.borrow().as_slice(), ["drop"]);
}

#[test]
fn delete_of_other_record_keeps_display() {
    let store = MemoryStore::new();
    let backend = FakeBackend::with_records(vec![
        record("a", 1, &[("joy", 0.4)]),
        record("b", 2, &[("anger", 0.7)]),
    ]);
    let history = reconciler(backend, &store);
    block_on(history.load());
    block_on(history.select("a")).unwrap();

    let outcome = block_on(history.delete("b", &|_: &str| true));
    assert_eq!(
        outcome,
        DeleteOutcome::Removed {
            cleared_display: false,
            remote_error: None
        }
    );
    assert_eq!(history.displayed().map(|r| r.id), Some("a".to_string()));
}

#[test]
fn declined_delete_changes_nothing() {
    let store = MemoryStore::new();
    let backend = FakeBackend::with_records(vec![record("a", 1, &[("joy", 0.4)])]);
    let history = reconciler(backend.clone(), &store);
    block_on(history.load());

    assert_eq!(
        block_on(history.delete("a", &|_: &str| false)),
        DeleteOutcome::Cancelled
    );
    assert_eq!(history.records().len(), 1);
    assert!(backend.state.deleted.borrow().is_empty());
}

#[test]
fn failed_select_leaves_display_untouched() {
    let store = MemoryStore::new();
    let backend = FakeBackend::with_records(vec![record("a", 1, &[("joy", 0.4)])]);
    let history = reconciler(backend.clone(), &store);
    block_on(history.load());
    block_on(history.select("a")).unwrap();

    backend.state.fetch_one_fails.set(true);
    let err = block_on(history.select("a")).unwrap_err();
    assert!(matches!(err, client::ClientError::PersistenceFailed(_)));
    assert_eq!(history.displayed().map(|r| r.id), Some("a".to_string()));

    backend.state.fetch_one_fails.set(false);
    assert!(block_on(history.select("missing")).is_err());
}

#[test]
fn load_arriving_after_local_change_is_not_applied() {
    let store = MemoryStore::new();
    let backend = FakeBackend::with_records(vec![record("stale", 1, &[("joy", 0.4)])]);
    backend.state.yield_on_fetch.set(true);
    let history = reconciler(backend, &store);
    let fresh = record("fresh", 7, &[("surprise", 0.8)]);

    let (loaded, ()) = block_on(futures::future::join(history.load(), async {
        history.upsert_newest(fresh.clone(), Origin::Remote)
    }));

    assert_eq!(loaded, vec![fresh.clone()]);
    assert_eq!(history.records(), vec![fresh]);
}
