//! # Adjournment Cap (BNSS §346)
//!
//! A court may grant a limited number of hearing postponements. Beyond the
//! cap, a further adjournment is allowed only with special reasons recorded
//! in writing.
//!
//! ## Grant Rule
//!
//! | count vs cap    | reason            | result                         |
//! |-----------------|-------------------|--------------------------------|
//! | `count < cap`   | any               | granted, `count + 1`           |
//! | `count >= cap`  | absent            | `NeedsOverride(ReasonAbsent)`  |
//! | `count >= cap`  | blank             | `NeedsOverride(ReasonBlank)`   |
//! | `count >= cap`  | non-blank         | granted, `count + 1`, override |
//!
//! A count already at `u32::MAX` cannot be raised and fails with
//! [`GrantError::CountExhausted`].
//!
//! [`AdjournmentState::grant()`] is pure. An override grant carries its
//! reason in the returned [`AdjournmentGrant`]; committing the new state
//! and writing the audit entry is the caller's single step.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use nyaya_core::CaseId;

/// Adjournments grantable without a recorded special reason.
pub const STATUTORY_ADJOURNMENT_CAP: u32 = 2;

/// Adjournment count of a case against its cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjournmentState {
    /// The case.
    pub case_id: CaseId,
    /// Adjournments granted so far.
    pub count: u32,
    /// Statutory cap.
    pub cap: u32,
}

/// Why an over-cap grant was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideCause {
    /// No reason was supplied.
    ReasonAbsent,
    /// The supplied reason was empty or whitespace.
    ReasonBlank,
}

impl std::fmt::Display for OverrideCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::ReasonAbsent => "no reason supplied",
            Self::ReasonBlank => "reason is blank",
        })
    }
}

/// The cap is reached; re-invoke the grant with a special reason.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("case {case_id} has used {count} of {cap} adjournments; override required ({cause})")]
#[serde(rename_all = "camelCase")]
pub struct NeedsOverride {
    /// The case.
    pub case_id: CaseId,
    /// Adjournments granted so far.
    pub count: u32,
    /// Statutory cap.
    pub cap: u32,
    /// Absent or blank reason.
    pub cause: OverrideCause,
}

/// Why [`AdjournmentState::grant()`] granted nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrantError {
    /// The cap is reached and no usable reason was supplied.
    #[error(transparent)]
    NeedsOverride(#[from] NeedsOverride),

    /// The count cannot represent another adjournment.
    #[error("case {case_id} cannot record an adjournment beyond {count}")]
    CountExhausted {
        /// The case.
        case_id: CaseId,
        /// The count that cannot be incremented.
        count: u32,
    },
}

/// Outcome of a successful grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjournmentGrant {
    /// State after the grant.
    pub state: AdjournmentState,
    /// The trimmed special reason, present only when the grant went past
    /// the cap.
    pub override_reason: Option<String>,
}

impl AdjournmentGrant {
    /// Whether this grant exceeded the cap.
    pub fn is_override(&self) -> bool {
        self.override_reason.is_some()
    }

    /// Ordinal of the adjournment just granted (1-based).
    pub fn adjournment_number(&self) -> u32 {
        self.state.count
    }
}

impl AdjournmentState {
    /// Build a state from a case snapshot's running count.
    pub fn new(case_id: CaseId, count: u32, cap: u32) -> Self {
        Self { case_id, count, cap }
    }

    /// Whether further grants need an override reason.
    pub fn is_at_cap(&self) -> bool {
        self.count >= self.cap
    }

    /// Grants left before the cap.
    pub fn remaining(&self) -> u32 {
        self.cap.saturating_sub(self.count)
    }

    /// Apply the grant rule. See the module table.
    pub fn grant(&self, override_reason: Option<&str>) -> Result<AdjournmentGrant, GrantError> {
        let count = self
            .count
            .checked_add(1)
            .ok_or_else(|| GrantError::CountExhausted {
                case_id: self.case_id.clone(),
                count: self.count,
            })?;
        let next = Self {
            case_id: self.case_id.clone(),
            count,
            cap: self.cap,
        };

        if !self.is_at_cap() {
            return Ok(AdjournmentGrant {
                state: next,
                override_reason: None,
            });
        }

        let reason = match override_reason.map(str::trim) {
            None => return Err(self.needs_override(OverrideCause::ReasonAbsent).into()),
            Some("") => return Err(self.needs_override(OverrideCause::ReasonBlank).into()),
            Some(reason) => reason,
        };

        Ok(AdjournmentGrant {
            state: next,
            override_reason: Some(reason.to_string()),
        })
    }

    fn needs_override(&self, cause: OverrideCause) -> NeedsOverride {
        NeedsOverride {
            case_id: self.case_id.clone(),
            count: self.count,
            cap: self.cap,
            cause,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn state(count: u32) -> AdjournmentState {
        AdjournmentState::new(
            CaseId::new("CNR-DL-0042").unwrap(),
            count,
            STATUTORY_ADJOURNMENT_CAP,
        )
    }

    fn refusal(result: Result<AdjournmentGrant, GrantError>) -> NeedsOverride {
        match result {
            Err(GrantError::NeedsOverride(refusal)) => refusal,
            other => panic!("expected NeedsOverride, got {other:?}"),
        }
    }

    #[test]
    fn under_cap_grants_unconditionally() {
        let g = state(0).grant(None).unwrap();
        assert_eq!(g.state.count, 1);
        assert!(!g.is_override());
        assert_eq!(g.adjournment_number(), 1);
    }

    #[test]
    fn under_cap_ignores_reason() {
        let g = state(1).grant(Some("witness unwell")).unwrap();
        assert_eq!(g.state.count, 2);
        assert!(g.override_reason.is_none());
    }

    #[test]
    fn at_cap_without_reason_needs_override() {
        let err = refusal(state(2).grant(None));
        assert_eq!(err.cause, OverrideCause::ReasonAbsent);
        assert_eq!(err.count, 2);
        assert_eq!(err.cap, 2);
    }

    #[test]
    fn at_cap_with_blank_reason_is_rejected() {
        for blank in ["", "   ", "\n\t"] {
            let err = refusal(state(2).grant(Some(blank)));
            assert_eq!(err.cause, OverrideCause::ReasonBlank);
        }
    }

    #[test]
    fn at_cap_with_reason_grants_override() {
        let g = state(2)
            .grant(Some("  counsel hospitalised, certificate on record "))
            .unwrap();
        assert_eq!(g.state.count, 3);
        assert_eq!(
            g.override_reason.as_deref(),
            Some("counsel hospitalised, certificate on record")
        );
        assert_eq!(g.adjournment_number(), 3);
    }

    #[test]
    fn above_cap_still_requires_reason() {
        assert!(state(5).grant(None).is_err());
        assert!(state(5).grant(Some("strike by bar association")).is_ok());
    }

    #[test]
    fn exhausted_count_is_not_granted() {
        let s = state(u32::MAX);
        assert_eq!(
            s.grant(Some("any reason")),
            Err(GrantError::CountExhausted {
                case_id: s.case_id.clone(),
                count: u32::MAX,
            })
        );
        assert!(state(u32::MAX - 1).grant(Some("last one")).is_ok());
    }

    #[test]
    fn grant_does_not_mutate_input() {
        let s = state(1);
        let _ = s.grant(None).unwrap();
        assert_eq!(s.count, 1);
    }

    #[test]
    fn remaining_and_cap_flags() {
        assert_eq!(state(0).remaining(), 2);
        assert_eq!(state(2).remaining(), 0);
        assert_eq!(state(7).remaining(), 0);
        assert!(state(2).is_at_cap());
        assert!(!state(1).is_at_cap());
    }

    #[test]
    fn needs_override_message_names_case() {
        let err = state(2).grant(None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "case CNR-DL-0042 has used 2 of 2 adjournments; override required (no reason supplied)"
        );
    }
}
