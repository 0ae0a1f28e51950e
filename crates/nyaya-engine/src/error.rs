//! # Engine Error Types
//!
//! One enum per runtime component. Refusals the caller is expected to
//! handle (`NeedsOverride`, a missed transfer deadline) are variants of
//! these enums, not panics or log lines.

use thiserror::Error;

use nyaya_audit::AuditError;
use nyaya_core::{CaseId, NyayaError};
use nyaya_state::{NeedsOverride, TransferError};

pub use crate::config::ConfigError;

/// Errors from [`crate::AdjournmentLimiter`].
#[derive(Error, Debug)]
pub enum LimiterError {
    /// The cap is reached and no usable override reason was given.
    #[error(transparent)]
    NeedsOverride(#[from] NeedsOverride),

    /// The docket count cannot be raised any further.
    #[error("no further adjournment can be recorded for case {case_id} past {count}")]
    CountExhausted {
        /// The case.
        case_id: CaseId,
        /// The docket count.
        count: u32,
    },

    /// No docket is open for the case.
    #[error("no adjournment docket open for case {case_id}")]
    UnknownCase {
        /// The case.
        case_id: CaseId,
    },

    /// The override could not be recorded, so nothing was granted.
    #[error("override not recorded: {0}")]
    Audit(#[from] AuditError),
}

impl LimiterError {
    /// Whether the grant can succeed if retried with a special reason.
    pub fn needs_override(&self) -> bool {
        matches!(self, Self::NeedsOverride(_))
    }
}

/// Errors from [`crate::DeadlineTracker`] and its handles.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The transfer state machine refused the action.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The transfer marker could not be read or written.
    #[error("transfer ledger: {0}")]
    Ledger(#[from] AuditError),

    /// A recorded marker contradicts the transfer it belongs to.
    #[error("transfer marker for case {case_id} is inconsistent: {reason}")]
    InconsistentMarker {
        /// The case.
        case_id: CaseId,
        /// What does not match.
        reason: String,
    },
}

/// Errors from building a case assessment.
#[derive(Error, Debug)]
pub enum AssessmentError {
    /// The snapshot is not valid JSON or misses required fields.
    #[error("invalid case snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A snapshot field failed validation.
    #[error("invalid case snapshot field {field}: {source}")]
    Field {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        #[source]
        source: NyayaError,
    },

    /// A jurisdiction mismatch was flagged without an origin station.
    #[error("case {case_id} is flagged for transfer but has no origin station")]
    MissingOriginStation {
        /// The case.
        case_id: CaseId,
    },

    /// The transfer window could not be applied to the filing time.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The recorded transfer marker does not fit the snapshot.
    #[error(transparent)]
    Marker(#[from] TrackerError),

    /// The configured transfer window is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors opening the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The case journal directory could not be opened.
    #[error(transparent)]
    Audit(#[from] AuditError),
}
