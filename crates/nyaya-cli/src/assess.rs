//! # Assess Subcommand
//!
//! Reads a case snapshot (JSON, camelCase keys) from a file or stdin and
//! prints its assessment.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use nyaya_core::Timestamp;
use nyaya_engine::{CaseAssessment, CaseSnapshot, Engine, EngineConfig};

use crate::{print_json, OutputFormat, EXIT_OK};

/// Arguments for `nyaya assess`.
#[derive(Args, Debug)]
pub struct AssessArgs {
    /// Snapshot file, or `-` for stdin.
    pub snapshot: PathBuf,

    /// Assess as of this instant instead of now (RFC 3339).
    #[arg(long)]
    pub at: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Read a snapshot from `path`, or from stdin when `path` is `-`.
pub fn read_snapshot(path: &Path) -> Result<CaseSnapshot> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading snapshot from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?
    };
    Ok(CaseSnapshot::from_json(&raw)?)
}

/// Parse an optional `--at` instant, defaulting to now.
pub fn instant_or_now(at: Option<&str>) -> Result<Timestamp> {
    match at {
        Some(raw) => Timestamp::parse_lenient(raw).with_context(|| format!("invalid instant {raw:?}")),
        None => Ok(Timestamp::now()),
    }
}

/// Execute `nyaya assess`.
pub fn run_assess(args: &AssessArgs, config: &EngineConfig) -> Result<u8> {
    let snapshot = read_snapshot(&args.snapshot)?;
    let now = instant_or_now(args.at.as_deref())?;
    let engine = Engine::open(config.clone())?;
    let assessment = engine
        .assess(&snapshot, now)
        .with_context(|| format!("assessing case {}", snapshot.case_id))?;

    match args.format {
        OutputFormat::Json => print_json(&assessment)?,
        OutputFormat::Text => print_assessment(&assessment),
    }
    Ok(EXIT_OK)
}

fn print_assessment(a: &CaseAssessment) {
    println!("Case:     {} (CNR {})", a.case_id, a.cnr_number);
    println!("As of:    {}", a.assessed_at);
    match &a.offence_category {
        Some(category) => println!("Offence:  {category}"),
        None => println!("Offence:  {}", a.citation),
    }
    println!("Citation: {}", a.citation);
    if let Some(t) = &a.transfer {
        println!(
            "Transfer: {} (from {}, deadline {})",
            t.display, t.origin_station, t.deadline
        );
    }
    println!(
        "Adjourn:  {} of {} used{}",
        a.adjournments.count,
        a.adjournments.cap,
        if a.adjournments.override_required {
            ", override required"
        } else {
            ""
        }
    );
    for notice in &a.notices {
        println!("  ! {notice}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.json");
        std::fs::write(
            &path,
            r#"{"caseId":"C-1","cnrNumber":"CNR-1","filingTimestamp":"2024-12-13T10:30:00Z","description":"theft"}"#,
        )
        .unwrap();
        let snap = read_snapshot(&path).unwrap();
        assert_eq!(snap.case_id.as_str(), "C-1");
        assert!(!snap.jurisdiction_mismatch);
        assert_eq!(snap.adjournments_count, 0);
    }

    #[test]
    fn missing_snapshot_is_an_error() {
        assert!(read_snapshot(Path::new("/nonexistent/case.json")).is_err());
    }

    #[test]
    fn instant_parsing() {
        assert_eq!(
            instant_or_now(Some("2024-12-13T16:00:00+05:30")).unwrap(),
            Timestamp::parse("2024-12-13T10:30:00Z").unwrap()
        );
        assert!(instant_or_now(Some("soon")).is_err());
    }

    #[test]
    fn run_assess_succeeds_on_valid_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.json");
        std::fs::write(
            &path,
            r#"{"caseId":"C-2","cnrNumber":"0/2024/UP/9","incidentDate":"2024-06-20","filingTimestamp":"2024-12-13T10:30:00Z","description":"cheating","jurisdictionMismatch":true,"originStation":"PS-NOIDA-20"}"#,
        )
        .unwrap();
        let config = EngineConfig {
            audit_dir: dir.path().join("audit"),
            ..EngineConfig::default()
        };
        let args = AssessArgs {
            snapshot: path,
            at: Some("2024-12-13T12:00:00Z".to_string()),
            format: OutputFormat::Json,
        };
        assert_eq!(run_assess(&args, &config).unwrap(), EXIT_OK);
    }
}
