//! # nyaya-audit: Append-Only Case Journal
//!
//! Durable, per-case record of the two facts the engine must never lose:
//!
//! - **Override entries.** Every adjournment granted past the statutory cap,
//!   with its special reason.
//! - **Transfer markers.** The instant a Zero-FIR transfer was completed,
//!   so a restarted tracker does not report a transferred case as expired.
//!
//! ## Contract
//!
//! - Append-only. Neither trait exposes update or delete.
//! - Sequence numbers are assigned by the log, start at 1 for each case,
//!   and increase by one per override entry. Callers cannot supply them.
//! - An append either lands completely (written, synced, indexed) or not at
//!   all.
//!
//! ## Backends
//!
//! - [`MemoryCaseStore`]: process-local, for tests and embedding.
//! - [`FileCaseStore`]: one JSONL journal per case under a directory,
//!   replayed on first access.

pub mod error;
pub mod file;
pub mod memory;
pub mod record;

pub use error::AuditError;
pub use file::FileCaseStore;
pub use memory::MemoryCaseStore;
pub use record::{CaseJournal, JournalRecord, OverrideAuditEntry, OverrideDraft, TransferMarker};

use nyaya_core::{CaseId, StationId, Timestamp};

/// Append-only log of adjournment overrides.
pub trait AuditLog: Send + Sync {
    /// Append an override, returning the entry with its assigned sequence.
    fn append(&self, draft: OverrideDraft) -> Result<OverrideAuditEntry, AuditError>;

    /// All override entries of a case, in insertion order.
    fn for_case(&self, case_id: &CaseId) -> Result<Vec<OverrideAuditEntry>, AuditError>;
}

/// Write-once record of completed Zero-FIR transfers.
pub trait TransferLedger: Send + Sync {
    /// Record that the case was transferred at `at`. A second record for
    /// the same case is rejected.
    fn mark_transferred(
        &self,
        case_id: &CaseId,
        at: Timestamp,
        target_station: Option<StationId>,
    ) -> Result<TransferMarker, AuditError>;

    /// The completion marker of a case, if one was recorded.
    fn transfer_marker(&self, case_id: &CaseId) -> Result<Option<TransferMarker>, AuditError>;
}
