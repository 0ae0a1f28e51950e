//! # Zero-FIR Deadline Tracker
//!
//! Drives a [`ZeroFirTransfer`] with a periodic tick and publishes its
//! countdown on a `tokio::sync::watch` channel.
//!
//! ## Design
//!
//! The transfer lives behind one `parking_lot::Mutex`. The tick task and
//! [`TrackerHandle::transfer()`] both take it, so expiry and transfer never
//! interleave: whichever acquires the lock first decides the outcome, and
//! the other sees a terminal state.
//!
//! Every tick recomputes remaining time from the deadline and the clock.
//! A delayed tick reports late but never moves the deadline.
//!
//! A completed transfer is written to the [`TransferLedger`] before it is
//! committed in memory. Starting a tracker for a case whose marker exists
//! restores it as TRANSFERRED rather than letting it expire.
//!
//! The ledger is the authority when several trackers follow one case. No
//! tracker commits EXPIRED without first finding the ledger free of a
//! marker, and a transfer refused because the ledger already holds one
//! adopts that marker. While the ledger cannot be read, expiry is held
//! back and retried on the next tick.
//!
//! The tick task stops by itself after publishing a terminal countdown,
//! on [`TrackerHandle::stop()`], or when the handle is dropped.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use nyaya_audit::{AuditError, TransferLedger, TransferMarker};
use nyaya_core::{CaseId, StationId, Timestamp};
use nyaya_state::{Countdown, TransferError, TransferStatus, ZeroFirTransfer};

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::TrackerError;

/// Starts deadline tracking tasks.
#[derive(Clone)]
pub struct DeadlineTracker {
    ledger: Arc<dyn TransferLedger>,
    clock: Arc<dyn Clock>,
    tick: std::time::Duration,
}

impl std::fmt::Debug for DeadlineTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadlineTracker")
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl DeadlineTracker {
    /// Tracker on the system clock with the configured tick period.
    pub fn new(ledger: Arc<dyn TransferLedger>, config: &EngineConfig) -> Self {
        Self {
            ledger,
            clock: Arc::new(SystemClock),
            tick: config.tick_interval(),
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Begin tracking `transfer`. Must be called inside a tokio runtime.
    ///
    /// A transfer already recorded in the ledger is restored as
    /// TRANSFERRED. The first countdown is published before this returns.
    pub fn start(&self, mut transfer: ZeroFirTransfer) -> Result<TrackerHandle, TrackerError> {
        if let Some(marker) = self.ledger.transfer_marker(&transfer.case_id)? {
            restore_from_marker(&mut transfer, &marker)?;
            tracing::info!(
                case_id = %transfer.case_id,
                at = %marker.at,
                "restored completed transfer from ledger"
            );
        }

        let initial = transfer.observe(self.clock.now());
        let (tx, rx) = watch::channel(initial);
        let state = Arc::new(Mutex::new(transfer));
        let tx = Arc::new(tx);

        let (task, cancel) = if initial.status.is_terminal() {
            (None, None)
        } else {
            let (cancel_tx, cancel_rx) = oneshot::channel();
            let task = tokio::spawn(tick_loop(
                state.clone(),
                tx.clone(),
                self.ledger.clone(),
                self.clock.clone(),
                self.tick,
                cancel_rx,
            ));
            (Some(task), Some(cancel_tx))
        };

        Ok(TrackerHandle {
            state,
            tx,
            rx,
            ledger: self.ledger.clone(),
            clock: self.clock.clone(),
            task,
            cancel,
        })
    }
}

/// Apply a ledger marker to a transfer being (re)started.
pub fn restore_from_marker(
    transfer: &mut ZeroFirTransfer,
    marker: &TransferMarker,
) -> Result<(), TrackerError> {
    if marker.case_id != transfer.case_id {
        return Err(TrackerError::InconsistentMarker {
            case_id: transfer.case_id.clone(),
            reason: format!("marker belongs to case {}", marker.case_id),
        });
    }
    if transfer.status == TransferStatus::Transferred {
        return Ok(());
    }
    transfer
        .transfer(marker.target_station.clone(), marker.at)
        .map_err(|e| TrackerError::InconsistentMarker {
            case_id: transfer.case_id.clone(),
            reason: e.to_string(),
        })
}

/// Observe `transfer` at `now`, consulting the ledger before letting it
/// expire. `Err` means the ledger could not be read and nothing changed.
fn observe_checked(
    transfer: &mut ZeroFirTransfer,
    ledger: &dyn TransferLedger,
    now: Timestamp,
) -> Result<Countdown, AuditError> {
    if transfer.status == TransferStatus::Pending && transfer.countdown(now).expired {
        if let Some(marker) = ledger.transfer_marker(&transfer.case_id)? {
            match restore_from_marker(transfer, &marker) {
                Ok(()) => tracing::info!(
                    case_id = %transfer.case_id,
                    at = %marker.at,
                    "transfer recorded by another tracker"
                ),
                Err(e) => tracing::error!(
                    case_id = %transfer.case_id,
                    error = %e,
                    "ledger marker does not fit the tracked transfer"
                ),
            }
        }
    }
    Ok(transfer.observe(now))
}

async fn tick_loop(
    state: Arc<Mutex<ZeroFirTransfer>>,
    tx: Arc<watch::Sender<Countdown>>,
    ledger: Arc<dyn TransferLedger>,
    clock: Arc<dyn Clock>,
    period: std::time::Duration,
    mut cancel: oneshot::Receiver<()>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut cancel => break,
            _ = interval.tick() => {}
        }

        let (observed, case_id, newly_expired) = {
            let mut transfer = state.lock();
            let was_pending = transfer.status == TransferStatus::Pending;
            let observed = observe_checked(&mut transfer, ledger.as_ref(), clock.now());
            let newly_expired = was_pending && transfer.status == TransferStatus::Expired;
            (observed, transfer.case_id.clone(), newly_expired)
        };
        let countdown = match observed {
            Ok(countdown) => countdown,
            Err(e) => {
                tracing::warn!(case_id = %case_id, error = %e, "ledger unreadable; expiry deferred");
                continue;
            }
        };
        tx.send_replace(countdown);

        if newly_expired {
            tracing::warn!(case_id = %case_id, "zero-FIR transfer deadline expired");
            metrics::counter!("nyaya_transfers_expired_total").increment(1);
        }
        if countdown.status.is_terminal() {
            break;
        }
    }
}

/// Live handle on a tracked transfer.
pub struct TrackerHandle {
    state: Arc<Mutex<ZeroFirTransfer>>,
    tx: Arc<watch::Sender<Countdown>>,
    rx: watch::Receiver<Countdown>,
    ledger: Arc<dyn TransferLedger>,
    clock: Arc<dyn Clock>,
    task: Option<JoinHandle<()>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl std::fmt::Debug for TrackerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerHandle")
            .field("transfer", &*self.state.lock())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl TrackerHandle {
    /// The case being tracked.
    pub fn case_id(&self) -> CaseId {
        self.state.lock().case_id.clone()
    }

    /// Last published countdown.
    pub fn current(&self) -> Countdown {
        *self.rx.borrow()
    }

    /// Receiver of every published countdown.
    pub fn subscribe(&self) -> watch::Receiver<Countdown> {
        self.tx.subscribe()
    }

    /// Observe at the current clock instant and publish the result.
    ///
    /// Fails only when expiry is due and the ledger cannot be read; the
    /// state is then left unchanged.
    pub fn snapshot(&self) -> Result<Countdown, TrackerError> {
        let mut transfer = self.state.lock();
        let countdown = observe_checked(&mut transfer, self.ledger.as_ref(), self.clock.now())?;
        self.tx.send_replace(countdown);
        Ok(countdown)
    }

    /// Countdown as of an arbitrary instant, without changing state.
    pub fn countdown_at(&self, at: Timestamp) -> Countdown {
        self.state.lock().countdown(at)
    }

    /// A copy of the tracked transfer record.
    pub fn record(&self) -> ZeroFirTransfer {
        self.state.lock().clone()
    }

    /// Complete the transfer now.
    ///
    /// The ledger marker is written before the in-memory state changes; if
    /// the write fails the transfer stays PENDING. A transfer at or after
    /// the deadline fails and leaves the case EXPIRED. If the ledger already
    /// holds a marker for the case, that transfer is adopted and this one
    /// fails with [`TransferError::AlreadyTerminal`].
    pub fn transfer(&self, target_station: Option<StationId>) -> Result<Countdown, TrackerError> {
        let mut transfer = self.state.lock();
        let now = self.clock.now();

        let mut next = transfer.clone();
        if let Err(e) = next.transfer(target_station.clone(), now) {
            if next.status != transfer.status {
                *transfer = next;
                self.tx.send_replace(transfer.countdown(now));
            }
            tracing::warn!(case_id = %transfer.case_id, error = %e, "transfer refused");
            return Err(e.into());
        }

        match self
            .ledger
            .mark_transferred(&transfer.case_id, now, target_station)
        {
            Ok(_) => {}
            Err(AuditError::TransferAlreadyRecorded { .. }) => {
                let marker = self.ledger.transfer_marker(&transfer.case_id)?.ok_or_else(|| {
                    TrackerError::InconsistentMarker {
                        case_id: transfer.case_id.clone(),
                        reason: "ledger reported a marker it cannot return".to_string(),
                    }
                })?;
                restore_from_marker(&mut transfer, &marker)?;
                self.tx.send_replace(transfer.countdown(now));
                tracing::warn!(
                    case_id = %transfer.case_id,
                    at = %marker.at,
                    "transfer already recorded; adopted existing marker"
                );
                return Err(TransferError::AlreadyTerminal {
                    case_id: transfer.case_id.clone(),
                    status: transfer.status,
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        }
        *transfer = next;

        let countdown = transfer.countdown(now);
        self.tx.send_replace(countdown);
        tracing::info!(
            case_id = %transfer.case_id,
            remaining = %countdown.hhmmss(),
            "zero-FIR transfer completed"
        );
        metrics::counter!("nyaya_transfers_completed_total").increment(1);
        Ok(countdown)
    }

    /// Whether the tick task is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the tick task and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "deadline tick task ended abnormally");
            }
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
