//! # Limits Subcommand
//!
//! Day-granular statutory limits: the investigation limit and, when a
//! detention period is given, undertrial release eligibility.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use nyaya_core::{investigation_status, undertrial_release_eligible, InvestigationStatus};

use crate::{print_json, OutputFormat, EXIT_OK};

/// Arguments for `nyaya limits`.
#[derive(Args, Debug)]
pub struct LimitsArgs {
    /// Days since the investigation began.
    #[arg(long)]
    pub investigation_days: i64,

    /// Maximum sentence of the offence, in years.
    #[arg(long)]
    pub max_sentence_years: u32,

    /// Days the accused has been detained as an undertrial.
    #[arg(long)]
    pub detained_days: Option<u32>,

    /// The offence is punishable with death or life imprisonment.
    #[arg(long)]
    pub capital_offence: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Computed limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsReport {
    pub investigation: InvestigationStatus,
    /// Present when a detention period was given.
    pub undertrial_release_eligible: Option<bool>,
}

/// Evaluate the limits described by `args`.
pub fn evaluate(args: &LimitsArgs) -> LimitsReport {
    LimitsReport {
        investigation: investigation_status(args.investigation_days, args.max_sentence_years),
        undertrial_release_eligible: args.detained_days.map(|days| {
            undertrial_release_eligible(days, args.max_sentence_years, args.capital_offence)
        }),
    }
}

/// Execute `nyaya limits`.
pub fn run_limits(args: &LimitsArgs) -> Result<u8> {
    let report = evaluate(args);
    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            let inv = &report.investigation;
            if inv.is_breached() {
                println!(
                    "Investigation: limit of {} days exceeded by {} days; default bail available",
                    inv.limit_days, -inv.remaining_days
                );
            } else {
                println!(
                    "Investigation: {} of {} days remaining ({:?})",
                    inv.remaining_days, inv.limit_days, inv.level
                );
            }
            match report.undertrial_release_eligible {
                Some(true) => println!("Undertrial:    eligible for release on personal bond"),
                Some(false) => println!("Undertrial:    not eligible"),
                None => {}
            }
        }
    }
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nyaya_core::UrgencyLevel;

    fn args(days: i64, years: u32, detained: Option<u32>, capital: bool) -> LimitsArgs {
        LimitsArgs {
            investigation_days: days,
            max_sentence_years: years,
            detained_days: detained,
            capital_offence: capital,
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn theft_investigation_warning() {
        let r = evaluate(&args(50, 3, None, false));
        assert_eq!(r.investigation.limit_days, 60);
        assert_eq!(r.investigation.level, UrgencyLevel::Warning);
        assert!(r.undertrial_release_eligible.is_none());
    }

    #[test]
    fn undertrial_half_sentence() {
        assert_eq!(
            evaluate(&args(0, 7, Some(1278), false)).undertrial_release_eligible,
            Some(true)
        );
        assert_eq!(
            evaluate(&args(0, 7, Some(1277), false)).undertrial_release_eligible,
            Some(false)
        );
    }

    #[test]
    fn capital_offence_never_eligible() {
        assert_eq!(
            evaluate(&args(0, 10, Some(5000), true)).undertrial_release_eligible,
            Some(false)
        );
    }
}
