//! # Deadline Tracker Tests
//!
//! Run on a paused tokio clock with an [`AnchoredClock`] at the filing
//! instant, so `tokio::time::advance` moves wall-clock time exactly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nyaya_audit::{AuditError, MemoryCaseStore, TransferLedger, TransferMarker};
use nyaya_core::{CaseId, StationId, Timestamp};
use nyaya_engine::{AnchoredClock, DeadlineTracker, EngineConfig, TrackerError, TrackerHandle};
use nyaya_state::{TransferError, TransferStatus, ZeroFirTransfer};

const DAY: u64 = 24 * 60 * 60;

fn filed() -> Timestamp {
    Timestamp::parse("2024-12-13T10:30:00Z").unwrap()
}

fn case() -> CaseId {
    CaseId::new("ZF-2024-0042").unwrap()
}

fn pending() -> ZeroFirTransfer {
    ZeroFirTransfer::statutory(case(), StationId::new("PS-KAROL-BAGH").unwrap(), filed()).unwrap()
}

fn start(ledger: Arc<MemoryCaseStore>) -> TrackerHandle {
    DeadlineTracker::new(ledger, &EngineConfig::default())
        .with_clock(Arc::new(AnchoredClock::new(filed())))
        .start(pending())
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn full_window_at_filing() {
    let handle = start(Arc::new(MemoryCaseStore::new()));
    let c = handle.current();
    assert_eq!(c.remaining_secs, DAY as i64);
    assert_eq!(c.hhmmss(), "24:00:00");
    assert!(handle.is_running());
    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn one_second_before_deadline_is_not_expired() {
    let handle = start(Arc::new(MemoryCaseStore::new()));
    tokio::time::advance(Duration::from_secs(DAY - 1)).await;
    let c = handle.snapshot().unwrap();
    assert_eq!(c.remaining_secs, 1);
    assert!(!c.expired);
    assert_eq!(c.status, TransferStatus::Pending);
    assert_eq!(c.hhmmss(), "00:00:01");
    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn tick_expires_at_deadline_and_task_exits() {
    let handle = start(Arc::new(MemoryCaseStore::new()));
    let mut rx = handle.subscribe();
    tokio::time::advance(Duration::from_secs(DAY)).await;
    let c = *rx.wait_for(|c| c.expired).await.unwrap();
    assert_eq!(c.remaining_secs, 0);
    assert_eq!(c.status, TransferStatus::Expired);
    assert_eq!(handle.record().status, TransferStatus::Expired);
    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn transferred_case_never_expires() {
    let ledger = Arc::new(MemoryCaseStore::new());
    let handle = start(ledger.clone());
    tokio::time::advance(Duration::from_secs(9 * 3600 + 30 * 60)).await;

    let c = handle
        .transfer(Some(StationId::new("PS-GURUGRAM-SEC-29").unwrap()))
        .unwrap();
    assert_eq!(c.status, TransferStatus::Transferred);
    assert_eq!(c.hhmmss(), "14:30:00");

    tokio::time::advance(Duration::from_secs(2 * DAY)).await;
    let c = handle.snapshot().unwrap();
    assert_eq!(c.status, TransferStatus::Transferred);
    assert!(!c.expired);

    let marker = ledger.transfer_marker(&case()).unwrap().unwrap();
    assert_eq!(marker.at, Timestamp::parse("2024-12-13T20:00:00Z").unwrap());
    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn transfer_at_deadline_fails_and_expires() {
    let ledger = Arc::new(MemoryCaseStore::new());
    let handle = start(ledger.clone());
    tokio::time::advance(Duration::from_secs(DAY)).await;

    let err = handle.transfer(None).unwrap_err();
    assert!(matches!(
        err,
        TrackerError::Transfer(TransferError::DeadlinePassed { .. })
            | TrackerError::Transfer(TransferError::AlreadyTerminal { .. })
    ));
    assert!(handle.current().expired);
    assert!(ledger.transfer_marker(&case()).unwrap().is_none());
    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn second_transfer_is_refused() {
    let handle = start(Arc::new(MemoryCaseStore::new()));
    handle.transfer(None).unwrap();
    assert!(matches!(
        handle.transfer(None),
        Err(TrackerError::Transfer(TransferError::AlreadyTerminal { .. }))
    ));
    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn restart_restores_transferred_case_from_ledger() {
    let ledger = Arc::new(MemoryCaseStore::new());
    {
        let handle = start(ledger.clone());
        tokio::time::advance(Duration::from_secs(3600)).await;
        handle.transfer(None).unwrap();
        handle.stop().await;
    }

    let three_days_later = Timestamp::parse("2024-12-16T10:30:00Z").unwrap();
    let restarted = DeadlineTracker::new(ledger, &EngineConfig::default())
        .with_clock(Arc::new(AnchoredClock::new(three_days_later)))
        .start(pending())
        .unwrap();
    let c = restarted.current();
    assert_eq!(c.status, TransferStatus::Transferred);
    assert!(!c.expired);
    assert!(!restarted.is_running());
}

#[tokio::test(start_paused = true)]
async fn countdown_at_is_pure() {
    let handle = start(Arc::new(MemoryCaseStore::new()));
    let later = Timestamp::parse("2024-12-14T10:30:00Z").unwrap();
    assert!(handle.countdown_at(later).expired);
    assert_eq!(handle.record().status, TransferStatus::Pending);
    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_stops_ticking() {
    let handle = start(Arc::new(MemoryCaseStore::new()));
    let mut rx = handle.subscribe();
    drop(handle);
    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        while rx.changed().await.is_ok() {}
    })
    .await;
    assert!(closed.is_ok());
}

#[tokio::test(start_paused = true)]
async fn second_tracker_adopts_recorded_transfer() {
    let ledger = Arc::new(MemoryCaseStore::new());
    let first = start(ledger.clone());
    let second = start(ledger.clone());
    tokio::time::advance(Duration::from_secs(3600)).await;

    first.transfer(None).unwrap();
    assert!(matches!(
        second.transfer(Some(StationId::new("PS-ROHINI").unwrap())),
        Err(TrackerError::Transfer(TransferError::AlreadyTerminal {
            status: TransferStatus::Transferred,
            ..
        }))
    ));
    let adopted = second.record();
    assert_eq!(adopted.status, TransferStatus::Transferred);
    assert_eq!(adopted.transferred_at, Some(Timestamp::parse("2024-12-13T11:30:00Z").unwrap()));
    assert!(adopted.target_station.is_none());

    tokio::time::advance(Duration::from_secs(2 * DAY)).await;
    assert_eq!(second.snapshot().unwrap().status, TransferStatus::Transferred);
    first.stop().await;
    second.stop().await;
}

#[tokio::test(start_paused = true)]
async fn idle_tracker_never_expires_a_recorded_transfer() {
    let ledger = Arc::new(MemoryCaseStore::new());
    let first = start(ledger.clone());
    let idle = start(ledger.clone());
    let mut rx = idle.subscribe();

    tokio::time::advance(Duration::from_secs(3600)).await;
    first.transfer(None).unwrap();
    tokio::time::advance(Duration::from_secs(2 * DAY)).await;

    let c = *rx.wait_for(|c| c.status.is_terminal()).await.unwrap();
    assert_eq!(c.status, TransferStatus::Transferred);
    assert!(!c.expired);
    assert_eq!(idle.record().status, TransferStatus::Transferred);
    first.stop().await;
    idle.stop().await;
}

/// Ledger whose reads can be switched off.
#[derive(Default)]
struct SwitchableLedger {
    inner: MemoryCaseStore,
    down: AtomicBool,
}

impl TransferLedger for SwitchableLedger {
    fn mark_transferred(
        &self,
        case_id: &CaseId,
        at: Timestamp,
        target_station: Option<StationId>,
    ) -> Result<TransferMarker, AuditError> {
        self.inner.mark_transferred(case_id, at, target_station)
    }

    fn transfer_marker(&self, case_id: &CaseId) -> Result<Option<TransferMarker>, AuditError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AuditError::Io(std::io::Error::other("journal unavailable")));
        }
        self.inner.transfer_marker(case_id)
    }
}

#[tokio::test(start_paused = true)]
async fn expiry_waits_for_a_readable_ledger() {
    let ledger = Arc::new(SwitchableLedger::default());
    let handle = DeadlineTracker::new(ledger.clone(), &EngineConfig::default())
        .with_clock(Arc::new(AnchoredClock::new(filed())))
        .start(pending())
        .unwrap();

    ledger.down.store(true, Ordering::SeqCst);
    tokio::time::advance(Duration::from_secs(DAY + 5)).await;
    assert!(matches!(handle.snapshot(), Err(TrackerError::Ledger(_))));
    assert_eq!(handle.record().status, TransferStatus::Pending);

    ledger.down.store(false, Ordering::SeqCst);
    let c = handle.snapshot().unwrap();
    assert_eq!(c.status, TransferStatus::Expired);
    assert_eq!(handle.record().status, TransferStatus::Expired);
    handle.stop().await;
}
