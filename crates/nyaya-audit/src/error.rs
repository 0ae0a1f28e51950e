//! # Audit Error Types

use thiserror::Error;

use nyaya_core::{CaseId, Timestamp};

/// Errors raised by case journal backends.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Filesystem failure while reading or appending a journal.
    #[error("io error on case journal: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A journal line failed to parse or broke sequence order.
    #[error("corrupt journal for case {case_id} at line {line}: {reason}")]
    CorruptEntry {
        /// The case whose journal is corrupt.
        case_id: String,
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// An override entry must carry a non-blank reason.
    #[error("override reason must not be blank")]
    BlankReason,

    /// The transfer of this case has already been recorded.
    #[error("transfer for case {case_id} already recorded at {at}")]
    TransferAlreadyRecorded {
        /// The case.
        case_id: CaseId,
        /// When the existing marker says it was transferred.
        at: Timestamp,
    },
}
