//! Evaluate every fund in a NAV/AUM history file and write a CSV of returns
//!
//! Accepts config via environment variables:
//!   INPUT_PATH, OUTPUT_PATH, MAX_FLOWS_WEIGHT, SECANT_RTOL, BRACKET_MAX_ITER

use anyhow::{Context, Result};
use fund_returns::returns::DEFAULT_MAX_FLOWS_WEIGHT;
use fund_returns::series::load_histories;
use fund_returns::{MetricsConfig, PortfolioRunner, SolverConfig};
use std::env;
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();

    let start = Instant::now();

    // Read config from environment or use defaults
    let input_path = env::var("INPUT_PATH").unwrap_or_else(|_| "fund_history.csv".to_string());
    let output_path = env::var("OUTPUT_PATH").unwrap_or_else(|_| "returns_output.csv".to_string());

    let max_flows_weight: f64 = env::var("MAX_FLOWS_WEIGHT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_FLOWS_WEIGHT);

    let defaults = SolverConfig::default();
    let solver = SolverConfig {
        secant_rtol: env::var("SECANT_RTOL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.secant_rtol),
        bracket_max_iter: env::var("BRACKET_MAX_ITER")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.bracket_max_iter),
        ..defaults
    };

    println!("Loading fund histories from {}...", input_path);
    let histories = load_histories(&input_path)
        .with_context(|| format!("failed to load {}", input_path))?;
    println!("Loaded {} funds in {:?}", histories.len(), start.elapsed());

    let runner = PortfolioRunner::new(MetricsConfig {
        max_flows_weight,
        solver,
    });

    println!("Computing returns (max flows weight {})...", max_flows_weight);
    let calc_start = Instant::now();
    let (reports, failures) = runner.run_batch_partitioned(&histories);
    println!("Returns complete in {:?} ({} failed)", calc_start.elapsed(), failures.len());

    // Failed funds are already logged by the runner
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("failed to create {}", output_path))?;
    for report in &reports {
        writer.serialize(report)?;
    }
    writer.flush()?;

    println!("Wrote {} of {} funds to {}", reports.len(), histories.len(), output_path);
    println!("Total time: {:?}", start.elapsed());

    Ok(())
}
