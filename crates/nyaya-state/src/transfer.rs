//! # Zero-FIR Transfer Deadline
//!
//! A complaint filed at a station without territorial jurisdiction must be
//! transferred to the correct station within a fixed window of the filing
//! instant.
//!
//! ## States
//!
//! ```text
//! PENDING ──transfer (now < deadline)──▶ TRANSFERRED (terminal)
//!    │
//!    └──── observe (now ≥ deadline) ───▶ EXPIRED (terminal)
//! ```
//!
//! ## Time Model
//!
//! Remaining time is always `deadline - now`, clamped at zero. Nothing is
//! decremented, so a missed observation only delays the report; it never
//! shifts the deadline. The instant the remaining time reaches zero the
//! transfer is expired, and a transfer attempted at that instant fails.
//!
//! Both transitions take `&mut self`. Whoever owns the value serialises
//! them, which is what makes a transfer and an expiry tick mutually
//! exclusive.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nyaya_core::{CaseId, StationId, Timestamp};

/// Statutory transfer window in hours.
pub const DEFAULT_TRANSFER_WINDOW_HOURS: i64 = 24;

// ─── Transfer Status ─────────────────────────────────────────────────

/// Lifecycle state of a Zero-FIR transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    /// Awaiting transfer; the deadline has not yet been reached.
    Pending,
    /// Transferred to the jurisdictional station in time (terminal).
    Transferred,
    /// The deadline passed while still pending (terminal).
    Expired,
}

impl TransferStatus {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Transferred | Self::Expired)
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "PENDING",
            Self::Transferred => "TRANSFERRED",
            Self::Expired => "EXPIRED",
        })
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from transfer lifecycle operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The transfer is already TRANSFERRED or EXPIRED.
    #[error("transfer for case {case_id} is in terminal state {status}")]
    AlreadyTerminal {
        /// The case.
        case_id: CaseId,
        /// The terminal status.
        status: TransferStatus,
    },

    /// The transfer was attempted at or after the deadline.
    #[error("transfer for case {case_id} missed its deadline {deadline}")]
    DeadlinePassed {
        /// The case.
        case_id: CaseId,
        /// The deadline that was missed.
        deadline: Timestamp,
    },

    /// The transfer was attempted before the complaint was filed.
    #[error("transfer for case {case_id} at {at} precedes its filing at {filed_at}")]
    BeforeFiling {
        /// The case.
        case_id: CaseId,
        /// The filing instant.
        filed_at: Timestamp,
        /// The rejected transfer instant.
        at: Timestamp,
    },

    /// The window is not positive or overflows the timestamp range.
    #[error("invalid transfer window of {hours} hours")]
    InvalidWindow {
        /// The rejected window, in hours.
        hours: i64,
    },
}

// ─── Countdown ───────────────────────────────────────────────────────

/// Point-in-time view of a transfer deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    /// Whole seconds left before the deadline, never negative.
    pub remaining_secs: i64,
    /// True exactly when the transfer is expired.
    pub expired: bool,
    /// Lifecycle state as of the observation.
    pub status: TransferStatus,
}

impl Countdown {
    /// Remaining time as a duration.
    pub fn remaining(&self) -> Duration {
        Duration::seconds(self.remaining_secs)
    }

    /// Remaining time as `HH:MM:SS`.
    pub fn hhmmss(&self) -> String {
        let secs = self.remaining_secs.max(0);
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            TransferStatus::Expired => f.write_str("EXPIRED"),
            TransferStatus::Transferred => write!(f, "TRANSFERRED ({} to spare)", self.hhmmss()),
            TransferStatus::Pending => f.write_str(&self.hhmmss()),
        }
    }
}

// ─── Zero-FIR Transfer ───────────────────────────────────────────────

/// A jurisdiction-mismatched filing awaiting transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroFirTransfer {
    /// The case being transferred.
    pub case_id: CaseId,
    /// Station where the complaint was filed.
    pub origin_station: StationId,
    /// Station the case was transferred to, once known.
    pub target_station: Option<StationId>,
    /// Filing instant.
    pub filed_at: Timestamp,
    /// `filed_at + window`.
    pub deadline: Timestamp,
    /// Current lifecycle state.
    pub status: TransferStatus,
    /// When the transfer was completed.
    pub transferred_at: Option<Timestamp>,
}

impl ZeroFirTransfer {
    /// Open a PENDING transfer with a deadline `window` after filing.
    pub fn new(
        case_id: CaseId,
        origin_station: StationId,
        filed_at: Timestamp,
        window: Duration,
    ) -> Result<Self, TransferError> {
        let invalid = || TransferError::InvalidWindow {
            hours: window.num_hours(),
        };
        if window <= Duration::zero() {
            return Err(invalid());
        }
        let deadline = filed_at.checked_add(window).ok_or_else(invalid)?;
        Ok(Self {
            case_id,
            origin_station,
            target_station: None,
            filed_at,
            deadline,
            status: TransferStatus::Pending,
            transferred_at: None,
        })
    }

    /// Open a PENDING transfer with the statutory 24-hour window.
    pub fn statutory(
        case_id: CaseId,
        origin_station: StationId,
        filed_at: Timestamp,
    ) -> Result<Self, TransferError> {
        Self::new(
            case_id,
            origin_station,
            filed_at,
            Duration::hours(DEFAULT_TRANSFER_WINDOW_HOURS),
        )
    }

    /// Compute the countdown at `now` without changing state.
    pub fn countdown(&self, now: Timestamp) -> Countdown {
        match self.status {
            TransferStatus::Pending => {
                let remaining_secs = self.deadline.since(&now).num_seconds().max(0);
                let expired = remaining_secs == 0;
                Countdown {
                    remaining_secs,
                    expired,
                    status: if expired {
                        TransferStatus::Expired
                    } else {
                        TransferStatus::Pending
                    },
                }
            }
            TransferStatus::Transferred => Countdown {
                remaining_secs: self
                    .transferred_at
                    .map(|at| self.deadline.since(&at).num_seconds().max(0))
                    .unwrap_or(0),
                expired: false,
                status: TransferStatus::Transferred,
            },
            TransferStatus::Expired => Countdown {
                remaining_secs: 0,
                expired: true,
                status: TransferStatus::Expired,
            },
        }
    }

    /// Observe the transfer at `now`, expiring it if the deadline has been
    /// reached while pending. Terminal states are left untouched.
    pub fn observe(&mut self, now: Timestamp) -> Countdown {
        let countdown = self.countdown(now);
        if self.status == TransferStatus::Pending && countdown.expired {
            self.status = TransferStatus::Expired;
        }
        countdown
    }

    /// Record the transfer at `now` (PENDING → TRANSFERRED).
    ///
    /// A transfer at or after the deadline expires the record and fails.
    /// A transfer before the filing instant fails and leaves it PENDING.
    pub fn transfer(
        &mut self,
        target_station: Option<StationId>,
        now: Timestamp,
    ) -> Result<(), TransferError> {
        if self.status.is_terminal() {
            return Err(TransferError::AlreadyTerminal {
                case_id: self.case_id.clone(),
                status: self.status,
            });
        }
        if now < self.filed_at {
            return Err(TransferError::BeforeFiling {
                case_id: self.case_id.clone(),
                filed_at: self.filed_at,
                at: now,
            });
        }
        if now >= self.deadline {
            self.status = TransferStatus::Expired;
            return Err(TransferError::DeadlinePassed {
                case_id: self.case_id.clone(),
                deadline: self.deadline,
            });
        }
        self.status = TransferStatus::Transferred;
        self.transferred_at = Some(now);
        self.target_station = target_station;
        Ok(())
    }

    /// Whether the transfer is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
