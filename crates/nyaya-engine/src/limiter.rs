//! # Adjournment Limiter
//!
//! Serialises adjournment grants per case and couples every over-cap grant
//! to its audit entry.
//!
//! ## Grant Protocol
//!
//! Under the case's docket lock:
//!
//! 1. Apply the pure grant rule to the current state.
//! 2. If the grant is an override, append the audit entry.
//! 3. Commit the new count.
//!
//! Step 3 runs only if step 2 succeeded, so there is never a granted
//! override without its entry. Two racing grants on one case queue on the
//! docket lock; the second sees the first's count.
//!
//! Dockets of different cases are independent. The docket map lock is
//! only held to look up or insert a docket, never across an append.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use nyaya_audit::{AuditLog, OverrideAuditEntry, OverrideDraft};
use nyaya_core::{CaseId, CnrNumber, Timestamp};
use nyaya_state::{AdjournmentState, GrantError};

use crate::error::LimiterError;

/// Result of a successful grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantOutcome {
    /// State after the grant.
    pub state: AdjournmentState,
    /// The audit entry written for an override grant.
    pub audit_entry: Option<OverrideAuditEntry>,
}

impl GrantOutcome {
    /// Whether the grant exceeded the cap.
    pub fn is_override(&self) -> bool {
        self.audit_entry.is_some()
    }
}

#[derive(Debug)]
struct Docket {
    cnr: CnrNumber,
    state: AdjournmentState,
}

/// Per-case adjournment gate backed by an audit log.
pub struct AdjournmentLimiter {
    audit: Arc<dyn AuditLog>,
    cap: u32,
    dockets: RwLock<HashMap<CaseId, Arc<Mutex<Docket>>>>,
}

impl std::fmt::Debug for AdjournmentLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdjournmentLimiter")
            .field("cap", &self.cap)
            .field("open_cases", &self.dockets.read().len())
            .finish()
    }
}

impl AdjournmentLimiter {
    /// Create a limiter with the given cap.
    pub fn new(audit: Arc<dyn AuditLog>, cap: u32) -> Self {
        Self {
            audit,
            cap,
            dockets: RwLock::new(HashMap::new()),
        }
    }

    /// The cap applied to every case.
    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// Open the docket of a case from its snapshot count.
    ///
    /// An already-open docket is left as is. A snapshot count lower than
    /// the last audited adjournment is raised to it, since an override
    /// that was recorded was also granted.
    pub fn open_case(
        &self,
        case_id: CaseId,
        cnr: CnrNumber,
        count: u32,
    ) -> Result<AdjournmentState, LimiterError> {
        if let Some(docket) = self.dockets.read().get(&case_id) {
            return Ok(docket.lock().state.clone());
        }

        let audited = self
            .audit
            .for_case(&case_id)?
            .last()
            .map_or(0, |e| e.adjournment_number);
        let count = if audited > count {
            tracing::warn!(
                case_id = %case_id,
                snapshot_count = count,
                audited,
                "snapshot adjournment count is behind the audit trail; using audited count"
            );
            audited
        } else {
            count
        };

        let mut dockets = self.dockets.write();
        let docket = dockets.entry(case_id.clone()).or_insert_with(|| {
            Arc::new(Mutex::new(Docket {
                cnr,
                state: AdjournmentState::new(case_id, count, self.cap),
            }))
        });
        let state = docket.lock().state.clone();
        Ok(state)
    }

    /// Current state of an open case.
    pub fn state(&self, case_id: &CaseId) -> Option<AdjournmentState> {
        self.dockets
            .read()
            .get(case_id)
            .map(|d| d.lock().state.clone())
    }

    /// Grant an adjournment now. See [`Self::grant_at`].
    pub fn grant(
        &self,
        case_id: &CaseId,
        override_reason: Option<&str>,
    ) -> Result<GrantOutcome, LimiterError> {
        self.grant_at(case_id, override_reason, Timestamp::now())
    }

    /// Grant an adjournment, recording an override entry stamped `now` if
    /// the cap is already reached.
    pub fn grant_at(
        &self,
        case_id: &CaseId,
        override_reason: Option<&str>,
        now: Timestamp,
    ) -> Result<GrantOutcome, LimiterError> {
        let docket = self
            .dockets
            .read()
            .get(case_id)
            .cloned()
            .ok_or_else(|| LimiterError::UnknownCase {
                case_id: case_id.clone(),
            })?;
        let mut docket = docket.lock();

        let grant = match docket.state.grant(override_reason) {
            Ok(grant) => grant,
            Err(GrantError::CountExhausted { case_id, count }) => {
                tracing::error!(case_id = %case_id, count, "adjournment count exhausted");
                return Err(LimiterError::CountExhausted { case_id, count });
            }
            Err(GrantError::NeedsOverride(refusal)) => {
                tracing::warn!(
                    case_id = %case_id,
                    count = refusal.count,
                    cap = refusal.cap,
                    cause = %refusal.cause,
                    "adjournment refused; override required"
                );
                metrics::counter!("nyaya_adjournments_refused_total").increment(1);
                return Err(refusal.into());
            }
        };

        let audit_entry = match &grant.override_reason {
            Some(reason) => {
                let entry = self
                    .audit
                    .append(OverrideDraft {
                        case_id: case_id.clone(),
                        cnr_reference: docket.cnr.clone(),
                        recorded_at: now,
                        reason: reason.clone(),
                        adjournment_number: grant.adjournment_number(),
                    })
                    .map_err(|e| {
                        tracing::error!(case_id = %case_id, error = %e, "override audit append failed; grant withdrawn");
                        e
                    })?;
                tracing::info!(
                    case_id = %case_id,
                    adjournment = entry.adjournment_number,
                    sequence = entry.sequence,
                    "adjournment granted by override"
                );
                metrics::counter!("nyaya_adjournment_overrides_total").increment(1);
                Some(entry)
            }
            None => {
                tracing::info!(
                    case_id = %case_id,
                    adjournment = grant.adjournment_number(),
                    cap = self.cap,
                    "adjournment granted"
                );
                None
            }
        };

        docket.state = grant.state;
        metrics::counter!("nyaya_adjournments_granted_total").increment(1);
        Ok(GrantOutcome {
            state: docket.state.clone(),
            audit_entry,
        })
    }

    /// Override entries recorded for a case.
    pub fn history(&self, case_id: &CaseId) -> Result<Vec<OverrideAuditEntry>, LimiterError> {
        Ok(self.audit.for_case(case_id)?)
    }
}
