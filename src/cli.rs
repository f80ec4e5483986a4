//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Battery dispatch optimizer.
///
/// Solves one request, given as a JSON file or a built-in scenario, and
/// prints the schedule with a cost summary.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// JSON request file.
    #[clap(long, conflicts_with = "scenario")]
    pub request: Option<PathBuf>,

    /// Built-in scenario: `tou_day` or `price_spike`.
    #[clap(long)]
    pub scenario: Option<String>,

    /// Strategy: `deterministic`, `annealing`, or `sampling`. Overrides
    /// the request's strategy; defaults to the configured strategy for
    /// scenarios.
    #[clap(long, env = "DISPATCH_STRATEGY")]
    pub strategy: Option<String>,

    /// Seed for the stochastic strategies.
    #[clap(long, env = "DISPATCH_SEED")]
    pub seed: Option<u64>,

    /// Engine configuration TOML file.
    #[clap(long, conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in configuration preset: `default`, `conservative`, or `exploratory`.
    #[clap(long)]
    pub preset: Option<String>,

    /// Write the schedule as CSV to this path.
    #[clap(long = "schedule-out")]
    pub schedule_out: Option<PathBuf>,

    /// Print the full response as JSON instead of a table.
    #[clap(long)]
    pub json: bool,

    /// Serve the HTTP API instead of solving once.
    #[cfg(feature = "api")]
    #[clap(long)]
    pub serve: bool,

    /// HTTP API port.
    #[cfg(feature = "api")]
    #[clap(long, default_value = "3000", env = "DISPATCH_PORT")]
    pub port: u16,
}
