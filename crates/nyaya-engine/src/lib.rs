//! # nyaya-engine: Compliance Engine Runtime
//!
//! Wires the pure decisions of `nyaya-core` and the state machines of
//! `nyaya-state` to a clock, a tick and the case journal.
//!
//! ## Components
//!
//! - **Config** (`config.rs`): statutory defaults, YAML file, `NYAYA_*`
//!   environment overrides.
//!
//! - **Adjournment limiter** (`limiter.rs`): one lock per case docket;
//!   an over-cap grant and its audit entry form a single step.
//!
//! - **Deadline tracker** (`tracker.rs`): a tokio interval task per
//!   Zero-FIR transfer publishing `Countdown` values on a watch channel.
//!
//! - **Assessment** (`assessment.rs`): case snapshot in, classification,
//!   citation, notices and countdown out.
//!
//! [`Engine`] bundles the three runtime components over one file-backed
//! case store.

pub mod assessment;
pub mod clock;
pub mod config;
pub mod error;
pub mod limiter;
pub mod tracker;

use std::sync::Arc;

pub use assessment::{
    assess, AdjournmentView, AssessmentNotice, CaseAssessment, CaseSnapshot, TransferView,
    UNDETERMINED,
};
pub use clock::{AnchoredClock, Clock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use error::{AssessmentError, EngineError, LimiterError, TrackerError};
pub use limiter::{AdjournmentLimiter, GrantOutcome};
pub use tracker::{restore_from_marker, DeadlineTracker, TrackerHandle};

use nyaya_audit::{AuditLog, FileCaseStore, TransferLedger};
use nyaya_core::Timestamp;

/// The engine over a durable case store.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    store: Arc<FileCaseStore>,
    limiter: AdjournmentLimiter,
    tracker: DeadlineTracker,
}

impl Engine {
    /// Open the case store at `config.audit_dir` and build the components.
    pub fn open(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let store = Arc::new(FileCaseStore::open(&config.audit_dir)?);
        let limiter = AdjournmentLimiter::new(store.clone(), config.adjournment_cap);
        let tracker = DeadlineTracker::new(store.clone(), &config);
        tracing::debug!(
            audit_dir = %config.audit_dir.display(),
            cap = config.adjournment_cap,
            window_hours = config.transfer_window_hours,
            "engine opened"
        );
        Ok(Self {
            config,
            store,
            limiter,
            tracker,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The adjournment limiter.
    pub fn limiter(&self) -> &AdjournmentLimiter {
        &self.limiter
    }

    /// The deadline tracker factory.
    pub fn tracker(&self) -> &DeadlineTracker {
        &self.tracker
    }

    /// The case store as an audit log.
    pub fn audit_log(&self) -> &dyn AuditLog {
        self.store.as_ref()
    }

    /// The case store as a transfer ledger.
    pub fn transfer_ledger(&self) -> &dyn TransferLedger {
        self.store.as_ref()
    }

    /// Assess a snapshot at `now`, honouring any recorded transfer.
    pub fn assess(
        &self,
        snapshot: &CaseSnapshot,
        now: Timestamp,
    ) -> Result<CaseAssessment, AssessmentError> {
        let marker = self
            .store
            .transfer_marker(&snapshot.case_id)
            .map_err(TrackerError::from)?;
        assess(snapshot, &self.config, now, marker.as_ref())
    }
}
