//! # Statutory Regime Resolution
//!
//! Decides which criminal code governs an offence and cites the matching
//! section.
//!
//! ## Non-Retroactivity
//!
//! An act is judged by the law in force on the day it occurred (Article 20
//! protection). [`resolve_regime()`] therefore depends on the incident date
//! alone: dates strictly before [`CUTOFF_DATE`] resolve to
//! [`Regime::Legacy`], the cutoff date and later to [`Regime::Current`].
//! There is no clock read anywhere in this module.
//!
//! ## Missing Incident Date
//!
//! When the incident date is absent or unparseable the resolver assumes
//! [`Regime::Current`]. This is a policy decision, and the assignment
//! records it as [`RegimeBasis::AssumedCurrent`] so the display layer can
//! show the assumption instead of hiding it.
//!
//! ## Section Table
//!
//! [`section_for()`] is an exhaustive `match` over category × regime. Adding
//! a category without both entries fails to compile.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::offence::OffenceCategory;
use crate::temporal::IncidentDate;

/// First day on which the current code applies (1 July 2024).
pub const CUTOFF_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2024, 7, 1) {
    Some(date) => date,
    None => panic!("cutoff date is a valid calendar date"),
};

/// The statute governing an offence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    /// Indian Penal Code, 1860: offences before the cutoff.
    Legacy,
    /// Bharatiya Nyaya Sanhita, 2023: offences on or after the cutoff.
    Current,
}

impl Regime {
    /// Full act name used in citations.
    pub fn act_name(&self) -> &'static str {
        match self {
            Self::Legacy => "Indian Penal Code, 1860",
            Self::Current => "Bharatiya Nyaya Sanhita, 2023",
        }
    }

    /// Short code of the act (`IPC` / `BNS`).
    pub fn short_code(&self) -> &'static str {
        match self {
            Self::Legacy => "IPC",
            Self::Current => "BNS",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Legacy => "LEGACY",
            Self::Current => "CURRENT",
        })
    }
}

/// How the regime of an assignment was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegimeBasis {
    /// Resolved from a known incident date.
    IncidentDate,
    /// No usable incident date; the current code was assumed.
    AssumedCurrent,
}

/// Statutory details for one category under one regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffenceDetails {
    /// Section number within the act, e.g. `303(2)`.
    pub section: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Punishment summary.
    pub punishment: &'static str,
    /// Whether the offence is bailable.
    pub bailable: bool,
    /// Whether the offence is cognizable.
    pub cognizable: bool,
}

/// Resolve the governing regime from an incident date.
pub fn resolve_regime(incident_date: Option<IncidentDate>) -> Regime {
    match incident_date {
        Some(date) if date.as_date() < CUTOFF_DATE => Regime::Legacy,
        Some(_) => Regime::Current,
        None => Regime::Current,
    }
}

/// Look up the statutory details of a category under a regime.
pub fn section_for(category: OffenceCategory, regime: Regime) -> OffenceDetails {
    use OffenceCategory::*;
    use Regime::*;

    let (section, label, punishment) = match (category, regime) {
        (Theft, Legacy) => ("379", "Theft (IPC)", "3 Years"),
        (Theft, Current) => ("303(2)", "Theft (BNS)", "3 Years / Community Service"),
        (Snatching, Legacy) => ("379", "Theft (IPC) - No specific section", "3 Years"),
        (Snatching, Current) => ("304", "Snatching (BNS)", "3 Years + Fine"),
        (Cheating, Legacy) => ("420", "Cheating (IPC)", "7 Years"),
        (Cheating, Current) => ("318(4)", "Cheating (BNS)", "7 Years"),
        (Murder, Legacy) => ("302", "Murder (IPC)", "Death/Life Imprisonment"),
        (Murder, Current) => ("103(1)", "Murder (BNS)", "Death/Life Imprisonment"),
        (Rape, Legacy) => ("375", "Rape (IPC)", "7 Years - Life"),
        (Rape, Current) => ("63", "Rape (BNS)", "10 Years - Life"),
    };

    OffenceDetails {
        section,
        label,
        punishment,
        bailable: false,
        cognizable: true,
    }
}

/// The statute and section assigned to a classified offence.
///
/// Created once at classification time and never mutated. A corrected
/// incident date produces a new assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimeAssignment {
    /// The classified offence.
    pub offence_category: OffenceCategory,
    /// The incident date the decision was made on, if known.
    pub incident_date: Option<IncidentDate>,
    /// The governing regime.
    pub resolved_regime: Regime,
    /// How the regime was determined.
    pub basis: RegimeBasis,
    /// Section number within the act.
    pub section_code: &'static str,
    /// Full act name.
    pub act_name: &'static str,
    /// Statutory details of the offence under the resolved regime.
    pub details: OffenceDetails,
}

impl RegimeAssignment {
    /// Citation in the stable display form `Section {section}, {act}`.
    pub fn citation(&self) -> String {
        format!("Section {}, {}", self.section_code, self.act_name)
    }

    /// Compact reference such as `BNS 304`.
    pub fn short_reference(&self) -> String {
        format!("{} {}", self.resolved_regime.short_code(), self.section_code)
    }

    /// Whether the regime rests on an assumption rather than a known date.
    pub fn is_assumed(&self) -> bool {
        self.basis == RegimeBasis::AssumedCurrent
    }
}

/// Build the regime assignment for a classified offence.
pub fn assign(category: OffenceCategory, incident_date: Option<IncidentDate>) -> RegimeAssignment {
    let regime = resolve_regime(incident_date);
    let details = section_for(category, regime);
    RegimeAssignment {
        offence_category: category,
        incident_date,
        resolved_regime: regime,
        basis: if incident_date.is_some() {
            RegimeBasis::IncidentDate
        } else {
            RegimeBasis::AssumedCurrent
        },
        section_code: details.section,
        act_name: regime.act_name(),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<IncidentDate> {
        IncidentDate::from_ymd(y, m, d)
    }

    #[test]
    fn boundary_is_inclusive_of_cutoff() {
        assert_eq!(resolve_regime(date(2024, 6, 30)), Regime::Legacy);
        assert_eq!(resolve_regime(date(2024, 7, 1)), Regime::Current);
        assert_eq!(resolve_regime(date(2024, 7, 2)), Regime::Current);
    }

    #[test]
    fn missing_date_assumes_current_and_says_so() {
        assert_eq!(resolve_regime(None), Regime::Current);
        let a = assign(OffenceCategory::Theft, None);
        assert_eq!(a.resolved_regime, Regime::Current);
        assert_eq!(a.basis, RegimeBasis::AssumedCurrent);
        assert!(a.is_assumed());
    }

    #[test]
    fn table_is_total() {
        for category in OffenceCategory::all() {
            for regime in [Regime::Legacy, Regime::Current] {
                let d = section_for(*category, regime);
                assert!(!d.section.is_empty(), "{category} / {regime}");
                assert!(!d.label.is_empty());
            }
        }
    }

    #[test]
    fn snatching_has_no_legacy_section_of_its_own() {
        assert_eq!(
            section_for(OffenceCategory::Snatching, Regime::Legacy).section,
            section_for(OffenceCategory::Theft, Regime::Legacy).section
        );
        assert_eq!(section_for(OffenceCategory::Snatching, Regime::Current).section, "304");
    }

    #[test]
    fn citation_format_is_stable() {
        let current = assign(OffenceCategory::Snatching, date(2024, 12, 10));
        assert_eq!(current.citation(), "Section 304, Bharatiya Nyaya Sanhita, 2023");
        assert_eq!(current.short_reference(), "BNS 304");

        let legacy = assign(OffenceCategory::Cheating, date(2023, 1, 5));
        assert_eq!(legacy.citation(), "Section 420, Indian Penal Code, 1860");
        assert_eq!(legacy.basis, RegimeBasis::IncidentDate);
    }

    #[test]
    fn assignment_serializes_for_display() {
        let a = assign(OffenceCategory::Murder, date(2024, 7, 1));
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["offenceCategory"], "MURDER");
        assert_eq!(json["resolvedRegime"], "CURRENT");
        assert_eq!(json["sectionCode"], "103(1)");
        assert_eq!(json["incidentDate"], "2024-07-01");
        assert_eq!(json["basis"], "INCIDENT_DATE");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_date() -> impl Strategy<Value = IncidentDate> {
            (-20_000i64..20_000).prop_map(|offset| {
                IncidentDate::new(CUTOFF_DATE + chrono::Duration::days(offset))
            })
        }

        proptest! {
            #[test]
            fn regime_is_pure_function_of_date(d in any_date()) {
                let expected = if d.as_date() < CUTOFF_DATE {
                    Regime::Legacy
                } else {
                    Regime::Current
                };
                prop_assert_eq!(resolve_regime(Some(d)), expected);
                // Repeated evaluation yields the same answer.
                prop_assert_eq!(resolve_regime(Some(d)), resolve_regime(Some(d)));
            }

            #[test]
            fn assignment_agrees_with_resolver(d in any_date(), idx in 0usize..5) {
                let category = OffenceCategory::all()[idx];
                let a = assign(category, Some(d));
                prop_assert_eq!(a.resolved_regime, resolve_regime(Some(d)));
                prop_assert_eq!(a.act_name, a.resolved_regime.act_name());
                prop_assert_eq!(a.section_code, section_for(category, a.resolved_regime).section);
            }
        }
    }
}
