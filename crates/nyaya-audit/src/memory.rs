//! # In-Memory Case Store
//!
//! Process-local backend. All operations are synchronous; the lock is
//! `parking_lot`, never held across an `.await`, and non-poisoning.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use nyaya_core::{CaseId, StationId, Timestamp};

use crate::error::AuditError;
use crate::record::{CaseJournal, JournalRecord, OverrideAuditEntry, OverrideDraft, TransferMarker};
use crate::{AuditLog, TransferLedger};

/// Thread-safe, cloneable in-memory case journal store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCaseStore {
    journals: Arc<RwLock<HashMap<CaseId, CaseJournal>>>,
}

impl MemoryCaseStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cases with at least one record.
    pub fn len(&self) -> usize {
        self.journals.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for MemoryCaseStore {
    fn append(&self, draft: OverrideDraft) -> Result<OverrideAuditEntry, AuditError> {
        let mut journals = self.journals.write();
        let entry = match journals.get(&draft.case_id) {
            Some(journal) => journal.prepare_override(draft)?,
            None => CaseJournal::default().prepare_override(draft)?,
        };
        journals
            .entry(entry.case_id.clone())
            .or_default()
            .apply(JournalRecord::Override(entry.clone()))
            .map_err(|reason| AuditError::CorruptEntry {
                case_id: entry.case_id.to_string(),
                line: 0,
                reason,
            })?;
        Ok(entry)
    }

    fn for_case(&self, case_id: &CaseId) -> Result<Vec<OverrideAuditEntry>, AuditError> {
        Ok(self
            .journals
            .read()
            .get(case_id)
            .map(|j| j.overrides().to_vec())
            .unwrap_or_default())
    }
}

impl TransferLedger for MemoryCaseStore {
    fn mark_transferred(
        &self,
        case_id: &CaseId,
        at: Timestamp,
        target_station: Option<StationId>,
    ) -> Result<TransferMarker, AuditError> {
        let mut journals = self.journals.write();
        let marker = match journals.get(case_id) {
            Some(journal) => journal.prepare_transfer(case_id, at, target_station)?,
            None => CaseJournal::default().prepare_transfer(case_id, at, target_station)?,
        };
        journals
            .entry(case_id.clone())
            .or_default()
            .apply(JournalRecord::TransferCompleted(marker.clone()))
            .map_err(|reason| AuditError::CorruptEntry {
                case_id: case_id.to_string(),
                line: 0,
                reason,
            })?;
        Ok(marker)
    }

    fn transfer_marker(&self, case_id: &CaseId) -> Result<Option<TransferMarker>, AuditError> {
        Ok(self
            .journals
            .read()
            .get(case_id)
            .and_then(|j| j.transfer().cloned()))
    }
}
