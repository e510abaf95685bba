mod cli;
mod config;
mod run;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use vigil_compute::RiskEngine;
use vigil_core::config::load_dotenv;
use vigil_core::Config;

use crate::cli::{AnalyzeArgs, CliArgs, Command};

fn main() -> Result<ExitCode> {
    // Logs on stderr; stdout carries only the JSON payload.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let mut config = Config::from_env();

    match args.command {
        Command::ShowConfig => {
            print_json(&config.redacted_summary(), true)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Analyze(analyze) => {
            config::apply_overrides(&mut config, &analyze);
            config.log_summary();
            run_analyze(&config, analyze)
        }
    }
}

fn run_analyze(config: &Config, args: AnalyzeArgs) -> Result<ExitCode> {
    let engine = RiskEngine::from_config(config).context("failed to initialise scoring engine")?;
    let timeout = config.runtime.timeout_secs.map(Duration::from_secs);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    info!(file = %args.file.display(), "Analyzing dataset");
    let outcome = runtime.block_on(run::analyze_file(Arc::new(engine), args.file.clone(), timeout));
    // A timed-out scoring task is abandoned, not awaited.
    runtime.shutdown_timeout(Duration::from_millis(100));

    match outcome {
        Ok(analysis) if args.diagnostics => {
            print_json(&analysis, args.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(analysis) => {
            print_json(&analysis.report, args.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(payload) => {
            print_json(&payload, args.pretty)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let body = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to serialize output")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", body).context("failed to write output")?;
    Ok(())
}
