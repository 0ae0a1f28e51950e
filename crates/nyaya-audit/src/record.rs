//! # Journal Records
//!
//! The record types written to a case journal and the in-memory fold of
//! one case's journal ([`CaseJournal`]) shared by both backends.
//!
//! ## Line Format
//!
//! Each journal line is one JSON object tagged by `kind`:
//!
//! ```text
//! {"kind":"override","caseId":"ZFIR-001","cnrReference":"0/2024/DL/001","timestampUtc":"2024-12-20T09:15:00Z","reason":"...","adjournmentSequenceNumber":3,"sequence":1}
//! {"kind":"transfer_completed","caseId":"ZFIR-001","at":"2024-12-13T20:00:00Z","targetStation":"PS-NOIDA-3"}
//! ```

use serde::{Deserialize, Serialize};

use nyaya_core::{CaseId, CnrNumber, StationId, Timestamp};

use crate::error::AuditError;

/// Override details supplied by the caller. The log assigns the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideDraft {
    /// The case.
    pub case_id: CaseId,
    /// CNR reference of the case.
    pub cnr_reference: CnrNumber,
    /// When the override was granted.
    pub recorded_at: Timestamp,
    /// Special reason recorded for the override.
    pub reason: String,
    /// Ordinal of the adjournment granted by this override.
    pub adjournment_number: u32,
}

/// A recorded adjournment override. Never edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideAuditEntry {
    /// The case.
    pub case_id: CaseId,
    /// CNR reference of the case.
    pub cnr_reference: CnrNumber,
    /// When the override was granted.
    pub timestamp_utc: Timestamp,
    /// Special reason, never blank.
    pub reason: String,
    /// Ordinal of the adjournment granted by this override.
    #[serde(rename = "adjournmentSequenceNumber")]
    pub adjournment_number: u32,
    /// Log-assigned position within the case, starting at 1.
    pub sequence: u64,
}

/// Completion marker of a Zero-FIR transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferMarker {
    /// The case.
    pub case_id: CaseId,
    /// When the transfer completed.
    pub at: Timestamp,
    /// Station the case went to, if recorded.
    pub target_station: Option<StationId>,
}

/// One line of a case journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalRecord {
    /// An adjournment override.
    Override(OverrideAuditEntry),
    /// A completed transfer.
    TransferCompleted(TransferMarker),
}

impl JournalRecord {
    /// The case this record belongs to.
    pub fn case_id(&self) -> &CaseId {
        match self {
            Self::Override(entry) => &entry.case_id,
            Self::TransferCompleted(marker) => &marker.case_id,
        }
    }
}

/// Folded state of one case journal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseJournal {
    overrides: Vec<OverrideAuditEntry>,
    transfer: Option<TransferMarker>,
}

impl CaseJournal {
    /// Override entries in insertion order.
    pub fn overrides(&self) -> &[OverrideAuditEntry] {
        &self.overrides
    }

    /// The transfer marker, if any.
    pub fn transfer(&self) -> Option<&TransferMarker> {
        self.transfer.as_ref()
    }

    /// Sequence the next override entry will receive.
    pub fn next_sequence(&self) -> u64 {
        self.overrides.last().map_or(1, |e| e.sequence + 1)
    }

    /// Turn a draft into the entry this journal would append next.
    pub fn prepare_override(&self, draft: OverrideDraft) -> Result<OverrideAuditEntry, AuditError> {
        let reason = draft.reason.trim();
        if reason.is_empty() {
            return Err(AuditError::BlankReason);
        }
        Ok(OverrideAuditEntry {
            case_id: draft.case_id,
            cnr_reference: draft.cnr_reference,
            timestamp_utc: draft.recorded_at,
            reason: reason.to_string(),
            adjournment_number: draft.adjournment_number,
            sequence: self.next_sequence(),
        })
    }

    /// Build the marker record for a transfer, rejecting a second one.
    pub fn prepare_transfer(
        &self,
        case_id: &CaseId,
        at: Timestamp,
        target_station: Option<StationId>,
    ) -> Result<TransferMarker, AuditError> {
        if let Some(existing) = &self.transfer {
            return Err(AuditError::TransferAlreadyRecorded {
                case_id: case_id.clone(),
                at: existing.at,
            });
        }
        Ok(TransferMarker {
            case_id: case_id.clone(),
            at,
            target_station,
        })
    }

    /// Fold a record into the journal, checking journal invariants.
    ///
    /// Returns a description of the violation if the record cannot follow
    /// the current state.
    pub fn apply(&mut self, record: JournalRecord) -> Result<(), String> {
        match record {
            JournalRecord::Override(entry) => {
                let expected = self.next_sequence();
                if entry.sequence != expected {
                    return Err(format!(
                        "override sequence {} out of order, expected {expected}",
                        entry.sequence
                    ));
                }
                if entry.reason.trim().is_empty() {
                    return Err("override entry has a blank reason".to_string());
                }
                self.overrides.push(entry);
            }
            JournalRecord::TransferCompleted(marker) => {
                if self.transfer.is_some() {
                    return Err("duplicate transfer marker".to_string());
                }
                self.transfer = Some(marker);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(reason: &str) -> OverrideDraft {
        OverrideDraft {
            case_id: CaseId::new("ZFIR-001").unwrap(),
            cnr_reference: CnrNumber::new("0/2024/DL/001").unwrap(),
            recorded_at: Timestamp::parse("2024-12-20T09:15:00Z").unwrap(),
            reason: reason.to_string(),
            adjournment_number: 3,
        }
    }

    #[test]
    fn sequences_start_at_one_and_follow_on() {
        let mut journal = CaseJournal::default();
        let first = journal.prepare_override(draft("medical emergency")).unwrap();
        assert_eq!(first.sequence, 1);
        journal.apply(JournalRecord::Override(first)).unwrap();
        assert_eq!(journal.next_sequence(), 2);
    }

    #[test]
    fn blank_reason_rejected() {
        let journal = CaseJournal::default();
        assert!(matches!(
            journal.prepare_override(draft("  ")),
            Err(AuditError::BlankReason)
        ));
    }

    #[test]
    fn out_of_order_sequence_is_a_violation() {
        let mut journal = CaseJournal::default();
        let mut entry = journal.prepare_override(draft("x")).unwrap();
        entry.sequence = 2;
        assert!(journal.apply(JournalRecord::Override(entry)).is_err());
    }

    #[test]
    fn second_transfer_marker_rejected() {
        let mut journal = CaseJournal::default();
        let case = CaseId::new("ZFIR-001").unwrap();
        let at = Timestamp::parse("2024-12-13T20:00:00Z").unwrap();
        let marker = journal.prepare_transfer(&case, at, None).unwrap();
        journal.apply(JournalRecord::TransferCompleted(marker)).unwrap();
        assert!(matches!(
            journal.prepare_transfer(&case, at, None),
            Err(AuditError::TransferAlreadyRecorded { .. })
        ));
    }

    #[test]
    fn record_line_format() {
        let entry = CaseJournal::default()
            .prepare_override(draft("counsel unwell"))
            .unwrap();
        let line = serde_json::to_string(&JournalRecord::Override(entry)).unwrap();
        assert!(line.starts_with(r#"{"kind":"override","caseId":"ZFIR-001""#));
        assert!(line.contains(r#""adjournmentSequenceNumber":3"#));
        assert!(line.contains(r#""sequence":1"#));
        let back: JournalRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(back.case_id().as_str(), "ZFIR-001");
    }
}
