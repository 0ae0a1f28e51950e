//! # nyaya CLI entry point
//!
//! Parses command-line arguments, loads the engine configuration and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nyaya_cli::adjourn::{run_adjourn, run_audit, AdjournArgs, AuditArgs};
use nyaya_cli::assess::{run_assess, AssessArgs};
use nyaya_cli::classify::{run_classify, ClassifyArgs};
use nyaya_cli::limits::{run_limits, LimitsArgs};
use nyaya_cli::transfer::{run_countdown, run_transfer, CountdownArgs, TransferArgs};
use nyaya_engine::EngineConfig;

/// Nyaya compliance engine.
///
/// Maps offences to the statute in force when they occurred, tracks the
/// 24-hour Zero-FIR transfer deadline, and gates adjournments past the
/// statutory cap behind recorded special reasons.
#[derive(Parser, Debug)]
#[command(name = "nyaya", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a complaint description and cite the applicable section.
    Classify(ClassifyArgs),

    /// Assess a case snapshot: citation, transfer countdown, adjournments.
    Assess(AssessArgs),

    /// Grant an adjournment; past the cap a special reason is required.
    Adjourn(AdjournArgs),

    /// List the adjournment overrides recorded for a case.
    Audit(AuditArgs),

    /// Complete a Zero-FIR transfer before its deadline.
    Transfer(TransferArgs),

    /// Show the Zero-FIR transfer countdown of a case.
    Countdown(CountdownArgs),

    /// Investigation time limit and undertrial release eligibility.
    Limits(LimitsArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    Ok(match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::from_env()?,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let result = match &cli.command {
        Commands::Classify(args) => run_classify(args),
        Commands::Assess(args) => run_assess(args, &config),
        Commands::Adjourn(args) => run_adjourn(args, &config),
        Commands::Audit(args) => run_audit(args, &config),
        Commands::Transfer(args) => run_transfer(args, &config),
        Commands::Countdown(args) => run_countdown(args, &config),
        Commands::Limits(args) => run_limits(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
