//! # nyaya-state: Procedural State Machines
//!
//! Pure state machines over case snapshots. Nothing in this crate reads a
//! clock, performs I/O, or logs; every operation that depends on time takes
//! `now` as an argument so callers (and tests) control it.
//!
//! ## State Machines
//!
//! - **Transfer** (`transfer.rs`): Zero-FIR transfer deadline.
//!   `PENDING → TRANSFERRED | EXPIRED`, both terminal. The deadline is
//!   `filed_at + window`, and every observation recomputes remaining time
//!   from absolute timestamps.
//!
//! - **Adjournment** (`adjournment.rs`): hearing postponements against a
//!   statutory cap. Past the cap a grant requires a non-blank override
//!   reason; the grant result carries that reason so the caller can record
//!   it in the same step.

pub mod adjournment;
pub mod transfer;

// ─── Adjournment re-exports ─────────────────────────────────────────

pub use adjournment::{
    AdjournmentGrant, AdjournmentState, GrantError, NeedsOverride, OverrideCause,
    STATUTORY_ADJOURNMENT_CAP,
};

// ─── Transfer re-exports ────────────────────────────────────────────

pub use transfer::{
    Countdown, TransferError, TransferStatus, ZeroFirTransfer, DEFAULT_TRANSFER_WINDOW_HOURS,
};
