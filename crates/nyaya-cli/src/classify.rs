//! # Classify Subcommand
//!
//! Runs the offence classifier and the regime resolver on a description
//! typed at the command line.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use nyaya_core::{assign, classify, IncidentDate, OffenceCategory, RegimeAssignment};
use nyaya_engine::UNDETERMINED;

use crate::{print_json, OutputFormat, EXIT_OK};

/// Arguments for `nyaya classify`.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Complaint description. Several words may be given unquoted.
    #[arg(required = true)]
    pub description: Vec<String>,

    /// Incident date, `YYYY-MM-DD` or RFC 3339.
    #[arg(long)]
    pub incident_date: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Result of classifying one description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyReport {
    pub offence_category: Option<OffenceCategory>,
    pub assignment: Option<RegimeAssignment>,
    pub citation: String,
}

/// Classify `description` and resolve its regime.
pub fn classify_description(description: &str, incident_date: Option<&str>) -> ClassifyReport {
    let offence_category = classify(description);
    let assignment =
        offence_category.map(|category| assign(category, IncidentDate::parse_opt(incident_date)));
    let citation = assignment
        .as_ref()
        .map_or_else(|| UNDETERMINED.to_string(), RegimeAssignment::citation);
    ClassifyReport {
        offence_category,
        assignment,
        citation,
    }
}

/// Execute `nyaya classify`.
pub fn run_classify(args: &ClassifyArgs) -> Result<u8> {
    let description = args.description.join(" ");
    let report = classify_description(&description, args.incident_date.as_deref());
    tracing::debug!(category = ?report.offence_category, "classified description");

    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_report(&report),
    }
    Ok(EXIT_OK)
}

fn print_report(report: &ClassifyReport) {
    let Some(assignment) = &report.assignment else {
        println!("Offence:  {UNDETERMINED} (no offence keyword matched)");
        return;
    };
    let d = &assignment.details;
    println!("Offence:  {}", assignment.offence_category);
    println!(
        "Regime:   {} ({}){}",
        assignment.resolved_regime,
        assignment.resolved_regime.short_code(),
        if assignment.is_assumed() {
            "  [assumed: no valid incident date]"
        } else {
            ""
        }
    );
    println!("Citation: {}", report.citation);
    println!("  {} ({})", d.label, d.punishment);
    println!(
        "  {}, {}",
        if d.bailable { "bailable" } else { "non-bailable" },
        if d.cognizable { "cognizable" } else { "non-cognizable" }
    );
}
