//! # Case Assessment
//!
//! One call that turns a case snapshot into everything a station or court
//! screen shows about it: the offence category, the statutory citation,
//! the assumptions behind them, the transfer countdown and the adjournment
//! position.
//!
//! Assessment is pure. It reads no clock and writes nothing; callers pass
//! `now` and, if they have one, the case's transfer marker.

use serde::{Deserialize, Serialize};

use nyaya_audit::TransferMarker;
use nyaya_core::{
    assign, classify, CaseId, CnrNumber, IncidentDate, OffenceCategory, RegimeAssignment,
    StationId, Timestamp,
};
use nyaya_state::{AdjournmentState, Countdown, ZeroFirTransfer};

use crate::config::EngineConfig;
use crate::error::AssessmentError;
use crate::tracker::restore_from_marker;

/// Case data as supplied by the case-management collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSnapshot {
    pub case_id: CaseId,
    pub cnr_number: CnrNumber,
    #[serde(default)]
    pub incident_date: Option<String>,
    pub filing_timestamp: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub jurisdiction_mismatch: bool,
    #[serde(default)]
    pub adjournments_count: u32,
    #[serde(default)]
    pub origin_station: Option<StationId>,
}

impl CaseSnapshot {
    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, AssessmentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The filing instant, in UTC.
    pub fn filed_at(&self) -> Result<Timestamp, AssessmentError> {
        Timestamp::parse_lenient(&self.filing_timestamp).map_err(|source| {
            AssessmentError::Field {
                field: "filingTimestamp",
                source,
            }
        })
    }

    /// The incident date, if present and parseable.
    pub fn incident_date(&self) -> Option<IncidentDate> {
        IncidentDate::parse_opt(self.incident_date.as_deref())
    }

    /// The pending Zero-FIR transfer this snapshot implies, if any.
    pub fn zero_fir_transfer(
        &self,
        window: chrono::Duration,
    ) -> Result<Option<ZeroFirTransfer>, AssessmentError> {
        if !self.jurisdiction_mismatch {
            return Ok(None);
        }
        let origin = self
            .origin_station
            .clone()
            .ok_or_else(|| AssessmentError::MissingOriginStation {
                case_id: self.case_id.clone(),
            })?;
        let transfer = ZeroFirTransfer::new(self.case_id.clone(), origin, self.filed_at()?, window)?;
        Ok(Some(transfer))
    }
}

/// Something the reader of an assessment must be told.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentNotice {
    /// No offence keyword matched; classification is to be determined.
    OffenceUndetermined,
    /// No incident date was supplied; the current regime was assumed.
    IncidentDateMissing,
    /// The incident date could not be read; the current regime was assumed.
    IncidentDateUnparseable { raw: String },
    /// The Zero-FIR transfer deadline has passed.
    TransferDeadlineExpired,
    /// The CNR marks a Zero FIR but no jurisdiction mismatch is flagged.
    ZeroFirNotFlagged,
    /// Further adjournments need a recorded special reason.
    AdjournmentCapReached { count: u32, cap: u32 },
}

impl std::fmt::Display for AssessmentNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OffenceUndetermined => {
                f.write_str("offence could not be classified; to be determined by the officer")
            }
            Self::IncidentDateMissing => f.write_str(
                "incident date not supplied; Bharatiya Nyaya Sanhita, 2023 assumed",
            ),
            Self::IncidentDateUnparseable { raw } => write!(
                f,
                "incident date {raw:?} not understood; Bharatiya Nyaya Sanhita, 2023 assumed"
            ),
            Self::TransferDeadlineExpired => {
                f.write_str("zero-FIR transfer deadline has passed")
            }
            Self::ZeroFirNotFlagged => {
                f.write_str("CNR marks a zero FIR but no jurisdiction mismatch is flagged")
            }
            Self::AdjournmentCapReached { count, cap } => write!(
                f,
                "{count} of {cap} adjournments used; further adjournment needs recorded reasons"
            ),
        }
    }
}

/// Transfer part of an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferView {
    pub origin_station: StationId,
    pub deadline: Timestamp,
    pub countdown: Countdown,
    /// Countdown formatted for display.
    pub display: String,
}

/// Adjournment part of an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjournmentView {
    pub count: u32,
    pub cap: u32,
    pub remaining: u32,
    pub override_required: bool,
}

impl From<&AdjournmentState> for AdjournmentView {
    fn from(state: &AdjournmentState) -> Self {
        Self {
            count: state.count,
            cap: state.cap,
            remaining: state.remaining(),
            override_required: state.is_at_cap(),
        }
    }
}

/// Everything known about a case at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAssessment {
    pub case_id: CaseId,
    pub cnr_number: CnrNumber,
    pub assessed_at: Timestamp,
    /// `None` when the description matched no category.
    pub offence_category: Option<OffenceCategory>,
    pub regime: Option<RegimeAssignment>,
    /// `"Section …, <Act>"`, or `"TBD"` when undetermined.
    pub citation: String,
    pub transfer: Option<TransferView>,
    pub adjournments: AdjournmentView,
    pub notices: Vec<AssessmentNotice>,
}

/// Label shown in place of an undetermined classification.
pub const UNDETERMINED: &str = "TBD";

/// Assess a case snapshot at `now`.
pub fn assess(
    snapshot: &CaseSnapshot,
    config: &EngineConfig,
    now: Timestamp,
    transfer_marker: Option<&TransferMarker>,
) -> Result<CaseAssessment, AssessmentError> {
    let mut notices = Vec::new();

    let offence_category = classify(&snapshot.description);
    let regime = match offence_category {
        Some(category) => {
            let assignment = assign(category, snapshot.incident_date());
            if assignment.is_assumed() {
                notices.push(match snapshot.incident_date.as_deref().map(str::trim) {
                    None | Some("") => AssessmentNotice::IncidentDateMissing,
                    Some(raw) => AssessmentNotice::IncidentDateUnparseable {
                        raw: raw.to_string(),
                    },
                });
            }
            Some(assignment)
        }
        None => {
            notices.push(AssessmentNotice::OffenceUndetermined);
            None
        }
    };
    let citation = regime
        .as_ref()
        .map_or_else(|| UNDETERMINED.to_string(), RegimeAssignment::citation);

    let transfer = match snapshot.zero_fir_transfer(config.transfer_window()?)? {
        Some(mut transfer) => {
            if let Some(marker) = transfer_marker {
                restore_from_marker(&mut transfer, marker)?;
            }
            let countdown = transfer.observe(now);
            if countdown.expired {
                notices.push(AssessmentNotice::TransferDeadlineExpired);
            }
            Some(TransferView {
                origin_station: transfer.origin_station.clone(),
                deadline: transfer.deadline,
                countdown,
                display: countdown.to_string(),
            })
        }
        None => {
            if snapshot.cnr_number.is_zero_fir() {
                notices.push(AssessmentNotice::ZeroFirNotFlagged);
            }
            None
        }
    };

    let state = AdjournmentState::new(
        snapshot.case_id.clone(),
        snapshot.adjournments_count,
        config.adjournment_cap,
    );
    if state.is_at_cap() {
        notices.push(AssessmentNotice::AdjournmentCapReached {
            count: state.count,
            cap: state.cap,
        });
    }

    Ok(CaseAssessment {
        case_id: snapshot.case_id.clone(),
        cnr_number: snapshot.cnr_number.clone(),
        assessed_at: now,
        offence_category,
        regime,
        citation,
        transfer,
        adjournments: AdjournmentView::from(&state),
        notices,
    })
}
