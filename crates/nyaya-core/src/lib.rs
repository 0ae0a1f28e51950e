//! # nyaya-core: Foundational Types for the Compliance Engine
//!
//! This crate is the leaf of the workspace DAG. It defines the case
//! identifiers, time primitives, and the two pure decision functions the
//! rest of the engine builds on: offence classification and statutory
//! regime resolution.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for case identifiers.** `CaseId`, `CnrNumber`,
//!    `StationId`: validated constructors, no bare strings.
//!
//! 2. **Non-retroactive regime resolution.** `resolve_regime()` is a pure
//!    function of the incident date. Evaluation time never enters the
//!    decision.
//!
//! 3. **Total section table.** The category × regime table is an exhaustive
//!    `match`. A missing entry is a compile error, not a runtime lookup miss.
//!
//! 4. **Explicit classifier priority.** The keyword table is an ordered
//!    slice; the first matching category wins.
//!
//! 5. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `nyaya-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests; the only `panic!()` is in const
//!   evaluation of `CUTOFF_DATE` and fails the build, not a run.

pub mod error;
pub mod identity;
pub mod offence;
pub mod procedure;
pub mod regime;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::NyayaError;
pub use identity::{CaseId, CnrNumber, StationId};
pub use offence::{classify, OffenceCategory, OFFENCE_CATEGORY_COUNT};
pub use procedure::{
    investigation_status, undertrial_release_eligible, InvestigationStatus, UrgencyLevel,
};
pub use regime::{
    assign, resolve_regime, section_for, OffenceDetails, Regime, RegimeAssignment, RegimeBasis,
    CUTOFF_DATE,
};
pub use temporal::{IncidentDate, Timestamp};
