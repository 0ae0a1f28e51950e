//! # Adjourn and Audit Subcommands
//!
//! `adjourn` asks the limiter for one more adjournment of a case. Past the
//! cap it needs `--reason`; a refusal exits with code 2 and changes
//! nothing. `audit` lists the override entries recorded for a case.

use anyhow::Result;
use clap::Args;

use nyaya_audit::OverrideAuditEntry;
use nyaya_core::{CaseId, CnrNumber};
use nyaya_engine::{Engine, EngineConfig, GrantOutcome, LimiterError};

use crate::{print_json, OutputFormat, EXIT_OK, EXIT_REFUSED};

/// Arguments for `nyaya adjourn`.
#[derive(Args, Debug)]
pub struct AdjournArgs {
    /// Case identifier.
    #[arg(long = "case")]
    pub case_id: String,

    /// CNR number of the case.
    #[arg(long)]
    pub cnr: String,

    /// Adjournments already granted, per the case record.
    #[arg(long, default_value_t = 0)]
    pub count: u32,

    /// Special reason recorded in writing; required past the cap.
    #[arg(long)]
    pub reason: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Arguments for `nyaya audit`.
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Case identifier.
    #[arg(long = "case")]
    pub case_id: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Execute `nyaya adjourn`.
pub fn run_adjourn(args: &AdjournArgs, config: &EngineConfig) -> Result<u8> {
    let case_id = CaseId::new(args.case_id.as_str())?;
    let cnr = CnrNumber::new(args.cnr.as_str())?;
    let engine = Engine::open(config.clone())?;
    let limiter = engine.limiter();
    limiter.open_case(case_id.clone(), cnr, args.count)?;

    match limiter.grant(&case_id, args.reason.as_deref()) {
        Ok(outcome) => {
            match args.format {
                OutputFormat::Json => print_json(&outcome)?,
                OutputFormat::Text => print_outcome(&outcome),
            }
            Ok(EXIT_OK)
        }
        Err(LimiterError::NeedsOverride(refusal)) => {
            match args.format {
                OutputFormat::Json => print_json(&refusal)?,
                OutputFormat::Text => {
                    println!("REFUSED: {refusal}");
                    println!("  re-run with --reason \"<special reasons recorded in writing>\"");
                }
            }
            Ok(EXIT_REFUSED)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_outcome(outcome: &GrantOutcome) {
    let s = &outcome.state;
    println!(
        "OK: adjournment {} granted for case {} ({} of {} without override)",
        s.count,
        s.case_id,
        s.count.min(s.cap),
        s.cap
    );
    if let Some(entry) = &outcome.audit_entry {
        println!(
            "  override recorded: sequence {} at {}: {}",
            entry.sequence, entry.timestamp_utc, entry.reason
        );
    }
}

/// Execute `nyaya audit`.
pub fn run_audit(args: &AuditArgs, config: &EngineConfig) -> Result<u8> {
    let case_id = CaseId::new(args.case_id.as_str())?;
    let engine = Engine::open(config.clone())?;
    let entries = engine.audit_log().for_case(&case_id)?;

    match args.format {
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Text => print_entries(&case_id, &entries),
    }
    Ok(EXIT_OK)
}

fn print_entries(case_id: &CaseId, entries: &[OverrideAuditEntry]) {
    if entries.is_empty() {
        println!("No overrides recorded for case {case_id}");
        return;
    }
    println!("Overrides for case {case_id}:");
    for e in entries {
        println!(
            "  #{} {} adjournment {} (CNR {}): {}",
            e.sequence, e.timestamp_utc, e.adjournment_number, e.cnr_reference, e.reason
        );
    }
}
