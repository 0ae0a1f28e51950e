//! # nyaya-cli: Compliance Engine Command-Line Interface
//!
//! Operator tool over `nyaya-engine`.
//!
//! ## Subcommands
//!
//! - `classify`: Offence category and statutory citation for a description
//! - `assess`: Full assessment of a case snapshot file
//! - `adjourn`: Grant an adjournment, with an override reason past the cap
//! - `audit`: List the recorded overrides of a case
//! - `transfer`: Complete a Zero-FIR transfer before its deadline
//! - `countdown`: Show or follow the transfer countdown of a case
//! - `limits`: Investigation limit and undertrial release eligibility
//!
//! ## Exit Codes
//!
//! - `0`: success
//! - `1`: error (bad input, unreadable journal, I/O)
//! - `2`: refused by a statutory rule (override required, deadline passed)
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; decisions are made by the engine crates.
//! - Results go to stdout, logs to stderr, so `--format json` output can be
//!   piped.

pub mod adjourn;
pub mod assess;
pub mod classify;
pub mod limits;
pub mod transfer;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Successful run.
pub const EXIT_OK: u8 = 0;

/// The action was refused by a statutory rule.
pub const EXIT_REFUSED: u8 = 2;

/// Output format of a subcommand's result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
