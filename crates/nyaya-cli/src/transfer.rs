//! # Transfer and Countdown Subcommands
//!
//! Both rebuild the Zero-FIR transfer from its filing details and run it
//! through the deadline tracker, which restores a previously recorded
//! transfer from the case journal.
//!
//! - `transfer` completes the transfer now, if the deadline has not passed.
//! - `countdown` prints the remaining time once, or with `--follow` prints
//!   every tick until the transfer is terminal or Ctrl-C is pressed.

use anyhow::{Context, Result};
use clap::Args;

use nyaya_core::{CaseId, StationId, Timestamp};
use nyaya_engine::{Engine, EngineConfig, TrackerError};
use nyaya_state::{Countdown, TransferError, TransferStatus, ZeroFirTransfer};

use crate::{print_json, OutputFormat, EXIT_OK, EXIT_REFUSED};

/// Filing details identifying a Zero-FIR transfer.
#[derive(Args, Debug, Clone)]
pub struct FilingArgs {
    /// Case identifier.
    #[arg(long = "case")]
    pub case_id: String,

    /// Station where the complaint was filed.
    #[arg(long)]
    pub origin: String,

    /// Filing instant, RFC 3339 or naive `YYYY-MM-DDTHH:MM:SS` (UTC).
    #[arg(long)]
    pub filed_at: String,
}

impl FilingArgs {
    /// Build the pending transfer these details describe.
    pub fn to_transfer(&self, config: &EngineConfig) -> Result<ZeroFirTransfer> {
        let case_id = CaseId::new(self.case_id.as_str())?;
        let origin = StationId::new(self.origin.as_str())?;
        let filed_at = Timestamp::parse_lenient(&self.filed_at)
            .with_context(|| format!("invalid --filed-at {:?}", self.filed_at))?;
        Ok(ZeroFirTransfer::new(
            case_id,
            origin,
            filed_at,
            config.transfer_window()?,
        )?)
    }
}

/// Arguments for `nyaya transfer`.
#[derive(Args, Debug)]
pub struct TransferArgs {
    #[command(flatten)]
    pub filing: FilingArgs,

    /// Station with territorial jurisdiction receiving the case.
    #[arg(long)]
    pub target: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Arguments for `nyaya countdown`.
#[derive(Args, Debug)]
pub struct CountdownArgs {
    #[command(flatten)]
    pub filing: FilingArgs,

    /// Keep printing on every tick until the transfer is terminal.
    #[arg(long)]
    pub follow: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")
}

fn print_countdown(case_id: &str, countdown: &Countdown, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(countdown)?,
        OutputFormat::Text => println!("{case_id}: {countdown}"),
    }
    Ok(())
}

/// Execute `nyaya transfer`.
pub fn run_transfer(args: &TransferArgs, config: &EngineConfig) -> Result<u8> {
    let transfer = args.filing.to_transfer(config)?;
    let target = args
        .target
        .as_deref()
        .map(StationId::new)
        .transpose()?;
    let engine = Engine::open(config.clone())?;

    runtime()?.block_on(complete_transfer(&engine, transfer, target, args))
}

async fn complete_transfer(
    engine: &Engine,
    transfer: ZeroFirTransfer,
    target: Option<StationId>,
    args: &TransferArgs,
) -> Result<u8> {
    let handle = engine.tracker().start(transfer)?;
    let result = handle.transfer(target);
    handle.stop().await;

    match result {
        Ok(countdown) => {
            print_countdown(&args.filing.case_id, &countdown, args.format)?;
            Ok(EXIT_OK)
        }
        Err(TrackerError::Transfer(e @ TransferError::DeadlinePassed { .. }))
        | Err(TrackerError::Transfer(e @ TransferError::AlreadyTerminal { .. })) => {
            println!("REFUSED: {e}");
            Ok(EXIT_REFUSED)
        }
        Err(e) => Err(e.into()),
    }
}

/// Execute `nyaya countdown`.
pub fn run_countdown(args: &CountdownArgs, config: &EngineConfig) -> Result<u8> {
    let transfer = args.filing.to_transfer(config)?;
    let engine = Engine::open(config.clone())?;

    runtime()?.block_on(follow_countdown(&engine, transfer, args))
}

async fn follow_countdown(
    engine: &Engine,
    transfer: ZeroFirTransfer,
    args: &CountdownArgs,
) -> Result<u8> {
    let case_id = args.filing.case_id.as_str();
    let handle = engine.tracker().start(transfer)?;
    let first = handle.current();
    print_countdown(case_id, &first, args.format)?;

    if args.follow && !first.status.is_terminal() {
        let mut rx = handle.subscribe();
        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let countdown = *rx.borrow_and_update();
                    print_countdown(case_id, &countdown, args.format)?;
                    if countdown.status.is_terminal() {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!(case_id, "countdown interrupted");
                    break;
                }
            }
        }
    }

    let last = handle.current();
    handle.stop().await;
    Ok(if last.status == TransferStatus::Expired {
        EXIT_REFUSED
    } else {
        EXIT_OK
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &tempfile::TempDir) -> EngineConfig {
        EngineConfig {
            audit_dir: dir.path().to_path_buf(),
            ..EngineConfig::default()
        }
    }

    fn filing(filed_at: &str) -> FilingArgs {
        FilingArgs {
            case_id: "ZF-77".to_string(),
            origin: "PS-HAUZ-KHAS".to_string(),
            filed_at: filed_at.to_string(),
        }
    }

    #[test]
    fn filing_args_build_transfer() {
        let dir = tempfile::tempdir().unwrap();
        let t = filing("2024-12-13T10:30:00").to_transfer(&config(&dir)).unwrap();
        assert_eq!(t.deadline, Timestamp::parse("2024-12-14T10:30:00Z").unwrap());
        assert!(filing("tomorrow").to_transfer(&config(&dir)).is_err());
    }

    #[test]
    fn long_expired_transfer_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let args = TransferArgs {
            filing: filing("2020-01-01T00:00:00Z"),
            target: None,
            format: OutputFormat::Text,
        };
        assert_eq!(run_transfer(&args, &config(&dir)).unwrap(), EXIT_REFUSED);
    }

    #[test]
    fn fresh_transfer_succeeds_once() {
        let dir = tempfile::tempdir().unwrap();
        let filed = Timestamp::now().to_iso8601();
        let args = TransferArgs {
            filing: filing(&filed),
            target: Some("PS-SAKET".to_string()),
            format: OutputFormat::Json,
        };
        assert_eq!(run_transfer(&args, &config(&dir)).unwrap(), EXIT_OK);
        assert_eq!(run_transfer(&args, &config(&dir)).unwrap(), EXIT_REFUSED);

        let countdown = CountdownArgs {
            filing: filing(&filed),
            follow: true,
            format: OutputFormat::Text,
        };
        assert_eq!(run_countdown(&countdown, &config(&dir)).unwrap(), EXIT_OK);
    }

    #[test]
    fn countdown_of_expired_case_exits_refused() {
        let dir = tempfile::tempdir().unwrap();
        let args = CountdownArgs {
            filing: filing("2020-01-01T00:00:00Z"),
            follow: false,
            format: OutputFormat::Text,
        };
        assert_eq!(run_countdown(&args, &config(&dir)).unwrap(), EXIT_REFUSED);
    }
}
