//! # Procedural Time Limits
//!
//! Day-granular statutory limits that sit beside the regime decision:
//!
//! - **Investigation limit (BNSS §193).** 60 days for offences punishable
//!   with up to 3 years, 90 days above that. Exceeding it gives the accused
//!   an indefeasible right to default bail.
//!
//! - **Undertrial release (BNSS §479).** An undertrial detained for half of
//!   the maximum sentence is released on personal bond, except for offences
//!   punishable with death or life imprisonment.

use serde::{Deserialize, Serialize};

/// Investigation limit for offences punishable with up to 3 years.
pub const MINOR_OFFENCE_LIMIT_DAYS: i64 = 60;

/// Investigation limit for offences punishable with more than 3 years.
pub const MAJOR_OFFENCE_LIMIT_DAYS: i64 = 90;

/// Remaining days at or below which the limit is critical.
const CRITICAL_THRESHOLD_DAYS: i64 = 5;

/// Remaining days at or below which the limit is a warning.
const WARNING_THRESHOLD_DAYS: i64 = 15;

/// Urgency of an approaching statutory limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyLevel {
    /// Comfortably within the limit.
    Ok,
    /// 15 days or fewer remain.
    Warning,
    /// 5 days or fewer remain, or the limit is breached.
    Critical,
}

/// Status of an investigation against its statutory limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestigationStatus {
    /// Applicable limit in days.
    pub limit_days: i64,
    /// Days remaining; negative once breached.
    pub remaining_days: i64,
    /// Urgency classification.
    pub level: UrgencyLevel,
}

impl InvestigationStatus {
    /// Whether the limit has been exceeded.
    pub fn is_breached(&self) -> bool {
        self.remaining_days <= 0
    }
}

/// Evaluate an investigation that has run for `investigation_days` on an
/// offence with the given maximum sentence.
pub fn investigation_status(investigation_days: i64, max_sentence_years: u32) -> InvestigationStatus {
    let limit_days = if max_sentence_years > 3 {
        MAJOR_OFFENCE_LIMIT_DAYS
    } else {
        MINOR_OFFENCE_LIMIT_DAYS
    };
    let remaining_days = limit_days - investigation_days;
    let level = if remaining_days <= CRITICAL_THRESHOLD_DAYS {
        UrgencyLevel::Critical
    } else if remaining_days <= WARNING_THRESHOLD_DAYS {
        UrgencyLevel::Warning
    } else {
        UrgencyLevel::Ok
    };
    InvestigationStatus {
        limit_days,
        remaining_days,
        level,
    }
}

/// Whether an undertrial detained for `days_detained` must be released.
///
/// `excluded_offence` covers offences punishable with death or life
/// imprisonment, which are never eligible.
pub fn undertrial_release_eligible(
    days_detained: u32,
    max_sentence_years: u32,
    excluded_offence: bool,
) -> bool {
    if excluded_offence {
        return false;
    }
    let max_days = u64::from(max_sentence_years) * 365;
    // Compare 2·detained against max to avoid rounding the half.
    u64::from(days_detained) * 2 >= max_days
}
