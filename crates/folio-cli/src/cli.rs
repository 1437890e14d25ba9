//! CLI argument definitions.
//!
//! All analytics commands read local JSON snapshots (a portfolio definition
//! plus one price-series file per holding) so that runs are reproducible
//! from files alone. The `store` command inspects a replay-store directory.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Deterministic portfolio analytics over replay-stable market data.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Deterministic portfolio analytics")]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Performance metrics for a portfolio over its price history.
    Metrics(MetricsArgs),
    /// Fama-French three-factor regression of portfolio excess returns.
    Regression(RegressionArgs),
    /// Seeded Monte Carlo simulation of future portfolio returns.
    Simulate(SimulateArgs),
    /// Long-only efficient frontier over the portfolio's assets.
    Frontier(FrontierArgs),
    /// Inspect a replay-store directory.
    Store(StoreArgs),
}

#[derive(Debug, Args)]
pub struct PortfolioInputs {
    /// Portfolio definition JSON file.
    #[arg(long)]
    pub portfolio: PathBuf,

    /// Price series snapshot JSON files, one per holding.
    #[arg(long = "prices", required = true, num_args = 1..)]
    pub prices: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct MetricsArgs {
    #[command(flatten)]
    pub inputs: PortfolioInputs,

    /// Annual risk-free rate used by the Sharpe ratio.
    #[arg(long, default_value_t = 0.0)]
    pub risk_free: f64,
}

#[derive(Debug, Args)]
pub struct RegressionArgs {
    #[command(flatten)]
    pub inputs: PortfolioInputs,

    /// Factor series snapshot JSON file.
    #[arg(long)]
    pub factors: PathBuf,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub inputs: PortfolioInputs,

    /// Number of simulated paths.
    #[arg(long, default_value_t = 1000)]
    pub paths: usize,

    /// Horizon in trading days.
    #[arg(long, default_value_t = 252)]
    pub horizon: usize,

    /// Random seed. Required; there is no implicit default.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulation method: bootstrap or normal.
    #[arg(long, default_value = "bootstrap")]
    pub method: String,
}

#[derive(Debug, Args)]
pub struct FrontierArgs {
    #[command(flatten)]
    pub inputs: PortfolioInputs,

    /// Number of evenly spaced target returns.
    #[arg(long, default_value_t = 50)]
    pub points: usize,

    /// Annual risk-free rate for per-point Sharpe ratios.
    #[arg(long, default_value_t = 0.0)]
    pub risk_free: f64,
}

#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Root directory of the replay store.
    #[arg(long)]
    pub dir: PathBuf,

    #[command(subcommand)]
    pub action: StoreAction,
}

#[derive(Debug, Subcommand)]
pub enum StoreAction {
    /// Report whether a key is present.
    Exists(KeyArgs),
    /// Print the stored snapshot for a key.
    Read(KeyArgs),
}

#[derive(Debug, Args)]
pub struct KeyArgs {
    /// Key prefix, normally the source identifier.
    #[arg(long)]
    pub prefix: String,

    /// Key components as NAME=VALUE pairs; order does not matter.
    #[arg(long = "component", value_name = "NAME=VALUE", num_args = 1..)]
    pub components: Vec<String>,
}
