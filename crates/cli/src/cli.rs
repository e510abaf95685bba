use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vigil_core::AnomalyBackend;

/// Multi-signal fraud risk scoring for disbursement ledgers.
///
/// Reads a CSV or JSON dataset, scores every record with heuristic rules,
/// an anomaly detector and an identity-sharing graph, and prints the fused
/// risk report as JSON on stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "vigil", about = "Multi-signal fraud risk scoring engine")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a dataset and print the risk report
    Analyze(AnalyzeArgs),
    /// Print the resolved configuration
    ShowConfig,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Dataset to score (.csv or .json)
    pub file: PathBuf,

    /// Fixed anomaly seed (derived from the dataset when unset)
    #[arg(long, env = "VIGIL_SEED")]
    pub seed: Option<u64>,

    /// Number of isolation trees
    #[arg(long, env = "VIGIL_TREES")]
    pub trees: Option<usize>,

    /// Anomaly backend: isolation_forest or zscore
    #[arg(long, env = "VIGIL_BACKEND")]
    pub backend: Option<AnomalyBackend>,

    /// Build and score trees on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Abort the run after this many seconds
    #[arg(long, env = "VIGIL_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// YAML ScoringConfig document
    #[arg(long, env = "VIGIL_SCORING_CONFIG")]
    pub scoring_config: Option<PathBuf>,

    /// Include seed, stage timings and analyzer statistics in the output
    #[arg(long)]
    pub diagnostics: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}
