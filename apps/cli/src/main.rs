#![deny(warnings)]

//! Headless CLI: load a scenario, run the turn simulation, write purchases.

use anyhow::{bail, Context, Result};
use data_pipeline::{load_scenario, synthetic_scenario, write_json, write_records};
use sim_core::{validate_scenario, SimConfig};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: cli <input> [--output <path>] [--model simple|extended] \
[--config <yaml>] [--report <json>] | cli --synthetic <seed> [...]";

#[derive(Debug, Default)]
struct Args {
    input: Option<PathBuf>,
    synthetic: Option<u64>,
    output: Option<PathBuf>,
    model: Option<String>,
    config: Option<PathBuf>,
    report: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--output" | "-o" => args.output = it.next().map(PathBuf::from),
            "--model" => args.model = it.next(),
            "--config" => args.config = it.next().map(PathBuf::from),
            "--report" => args.report = it.next().map(PathBuf::from),
            "--synthetic" => args.synthetic = it.next().and_then(|s| s.parse().ok()),
            _ if args.input.is_none() && !arg.starts_with('-') => {
                args.input = Some(PathBuf::from(arg))
            }
            _ => {}
        }
    }
    args
}

fn sim_config(args: &Args) -> Result<SimConfig> {
    if let Some(path) = &args.config {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        return serde_yaml::from_str(&text)
            .with_context(|| format!("decoding config {}", path.display()));
    }
    match args.model.as_deref() {
        None | Some("extended") => Ok(SimConfig::extended()),
        Some("simple") => Ok(SimConfig::simple()),
        Some(other) => bail!("unknown model {other:?}, expected simple or extended"),
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args();
    info!(
        git_sha = env!("GIT_SHA"),
        build_date = env!("BUILD_DATE"),
        ?args,
        "starting CLI"
    );

    let config = sim_config(&args)?;
    let scenario = match (&args.input, args.synthetic) {
        (Some(path), _) => load_scenario(path)?,
        (None, Some(seed)) => synthetic_scenario(seed, 40, 100),
        (None, None) => bail!(USAGE),
    };
    validate_scenario(&scenario)?;
    info!(
        budget = scenario.budget,
        resources = scenario.resources.len(),
        turns = scenario.turns.len(),
        ?config,
        "scenario OK"
    );

    let outcome = sim_runtime::run_simulation(&scenario, config);

    let output = args.output.unwrap_or_else(|| PathBuf::from("output.txt"));
    write_records(&output, &outcome.records)?;
    if let Some(report) = &args.report {
        write_json(report, &outcome)?;
    }

    println!("Total Score: {}", outcome.score);
    println!(
        "KPI | turns: {} | purchase turns: {} | final budget: {}",
        outcome.reports.len(),
        outcome.records.len(),
        outcome.final_budget
    );

    Ok(())
}
