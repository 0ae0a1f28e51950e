//! # Case Journal Durability
//!
//! Restart behaviour of the file-backed store, and the ordering contract
//! both backends share.

use std::sync::Arc;
use std::thread;

use nyaya_audit::{AuditLog, FileCaseStore, MemoryCaseStore, OverrideDraft, TransferLedger};
use nyaya_core::{CaseId, CnrNumber, StationId, Timestamp};

fn case(id: &str) -> CaseId {
    CaseId::new(id).unwrap()
}

fn draft(id: &str, reason: &str, adjournment_number: u32) -> OverrideDraft {
    OverrideDraft {
        case_id: case(id),
        cnr_reference: CnrNumber::new(format!("CNR-{id}")).unwrap(),
        recorded_at: Timestamp::parse("2025-01-15T10:30:00Z").unwrap(),
        reason: reason.to_string(),
        adjournment_number,
    }
}

fn assert_strictly_increasing(store: &dyn AuditLog, id: &str) {
    let entries = store.for_case(&case(id)).unwrap();
    for pair in entries.windows(2) {
        assert!(pair[0].sequence < pair[1].sequence);
    }
}

#[test]
fn entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileCaseStore::open(dir.path()).unwrap();
        store.append(draft("SC-2024-77", "prosecution witness abroad", 3)).unwrap();
    }
    let store = FileCaseStore::open(dir.path()).unwrap();
    let entries = store.for_case(&case("SC-2024-77")).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].reason, "prosecution witness abroad");
    assert_eq!(entries[0].adjournment_number, 3);
    assert_eq!(entries[0].cnr_reference.as_str(), "CNR-SC-2024-77");
}

#[test]
fn sequence_continues_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileCaseStore::open(dir.path()).unwrap();
        store.append(draft("A", "one", 3)).unwrap();
        store.append(draft("A", "two", 4)).unwrap();
    }
    let store = FileCaseStore::open(dir.path()).unwrap();
    let third = store.append(draft("A", "three", 5)).unwrap();
    assert_eq!(third.sequence, 3);
    let reasons: Vec<_> = store
        .for_case(&case("A"))
        .unwrap()
        .into_iter()
        .map(|e| e.reason)
        .collect();
    assert_eq!(reasons, ["one", "two", "three"]);
}

#[test]
fn transfer_marker_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let at = Timestamp::parse("2024-12-13T20:00:00Z").unwrap();
    {
        let store = FileCaseStore::open(dir.path()).unwrap();
        store
            .mark_transferred(&case("ZF-9"), at, Some(StationId::new("PS-SAKET").unwrap()))
            .unwrap();
    }
    let store = FileCaseStore::open(dir.path()).unwrap();
    let marker = store.transfer_marker(&case("ZF-9")).unwrap().unwrap();
    assert_eq!(marker.at, at);
    assert_eq!(marker.target_station.unwrap().as_str(), "PS-SAKET");
    assert!(store.mark_transferred(&case("ZF-9"), at, None).is_err());
}

#[test]
fn marker_and_overrides_share_a_journal() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCaseStore::open(dir.path()).unwrap();
    let at = Timestamp::parse("2024-12-13T20:00:00Z").unwrap();
    store.append(draft("Z", "r1", 3)).unwrap();
    store.mark_transferred(&case("Z"), at, None).unwrap();
    store.append(draft("Z", "r2", 4)).unwrap();
    drop(store);

    let store = FileCaseStore::open(dir.path()).unwrap();
    assert_eq!(store.for_case(&case("Z")).unwrap().len(), 2);
    assert!(store.transfer_marker(&case("Z")).unwrap().is_some());
}

#[test]
fn interleaved_appends_keep_per_case_order_in_memory() {
    let store = Arc::new(MemoryCaseStore::new());
    interleave(store.clone());
    for id in ["A", "B", "C"] {
        assert_eq!(store.for_case(&case(id)).unwrap().len(), 20);
        assert_strictly_increasing(store.as_ref(), id);
    }
}

#[test]
fn interleaved_appends_keep_per_case_order_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileCaseStore::open(dir.path()).unwrap());
    interleave(store.clone());
    drop(store);

    let reopened = FileCaseStore::open(dir.path()).unwrap();
    for id in ["A", "B", "C"] {
        let entries = reopened.for_case(&case(id)).unwrap();
        assert_eq!(entries.len(), 20);
        assert_eq!(entries.last().unwrap().sequence, 20);
        assert_strictly_increasing(&reopened, id);
    }
}

fn interleave<S: AuditLog + 'static>(store: Arc<S>) {
    let handles: Vec<_> = ["A", "B", "C"]
        .into_iter()
        .flat_map(|id| {
            (0..2).map(move |worker| (id, worker))
        })
        .map(|(id, worker)| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    store
                        .append(draft(id, &format!("worker {worker} reason {i}"), 3 + i))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}
