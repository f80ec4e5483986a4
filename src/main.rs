//! Dispatch optimizer entry point: CLI wiring and config-driven service construction.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;

use dispatch_engine::cli::Args;
use dispatch_engine::config::EngineConfig;
use dispatch_engine::io::export::export_csv;
use dispatch_engine::scenario;
use dispatch_engine::service::{DispatchRequest, DispatchResponse, DispatchService};
use dispatch_engine::telemetry;

/// Scenario used when neither `--request` nor `--scenario` is given.
const DEFAULT_SCENARIO: &str = "tou_day";

/// Loads the engine configuration: `--config`, then `--preset`, then defaults.
fn load_config(args: &Args) -> Result<EngineConfig> {
    let config = if let Some(path) = &args.config {
        EngineConfig::from_toml_file(path)?
    } else if let Some(name) = &args.preset {
        EngineConfig::from_preset(name)?
    } else {
        EngineConfig::default()
    };

    let errors = config.validate();
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("invalid configuration:\n  {}", lines.join("\n  "));
    }
    Ok(config)
}

/// Builds the request from `--request` or a built-in scenario, applying
/// CLI overrides.
fn load_request(args: &Args, config: &EngineConfig) -> Result<DispatchRequest> {
    let mut request = if let Some(path) = &args.request {
        let body = fs::read_to_string(path)
            .with_context(|| format!("cannot read request \"{}\"", path.display()))?;
        DispatchRequest::from_json(&body)?
    } else {
        let name = args.scenario.as_deref().unwrap_or(DEFAULT_SCENARIO);
        scenario::from_name(name, &config.engine.strategy, None)?
    };

    if let Some(strategy) = &args.strategy {
        request.strategy = strategy.clone();
    }
    if args.seed.is_some() {
        request.seed = args.seed;
    }
    Ok(request)
}

fn print_schedule(response: &DispatchResponse) {
    for step in &response.schedule {
        println!("{step}");
    }
    for warning in &response.warnings {
        println!("warning: {warning}");
    }
    println!("\n{}", response.summary);
}

fn write_schedule(response: &DispatchResponse, path: &Path) -> Result<()> {
    export_csv(&response.schedule, &response.energy_balance, path)
        .with_context(|| format!("failed to write CSV \"{}\"", path.display()))?;
    info!(path = %path.display(), "schedule written");
    Ok(())
}

fn main() -> Result<()> {
    telemetry::init_tracing();
    let args = Args::parse();
    let config = load_config(&args)?;

    #[cfg(feature = "api")]
    if args.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(dispatch_engine::api::AppState {
            service: DispatchService::new(config),
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
        let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
        rt.block_on(dispatch_engine::api::serve(state, addr))?;
        return Ok(());
    }

    let request = load_request(&args, &config)?;
    let service = DispatchService::new(config);
    let response = service.dispatch(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_schedule(&response);
    }

    if let Some(path) = &args.schedule_out {
        write_schedule(&response, path)?;
    }
    Ok(())
}
