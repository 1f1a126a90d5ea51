//! Fund Returns CLI
//!
//! Computes TWR, MWR and the two counterfactual MWRs for every fund in a CSV
//! file of NAV/AUM history.

use anyhow::{bail, Context, Result};
use clap::Parser;
use fund_returns::returns::DEFAULT_MAX_FLOWS_WEIGHT;
use fund_returns::series::load_histories;
use fund_returns::{MetricsConfig, PortfolioRunner, ReturnsReport};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fund_returns", version, about = "Money-weighted and time-weighted fund returns")]
struct Cli {
    /// CSV with Date, NAV, AUM and optional Flows / FundID columns
    input: PathBuf,

    /// Cap on the absolute flow weight for the counterfactual MWRs
    #[arg(long, default_value_t = DEFAULT_MAX_FLOWS_WEIGHT, allow_negative_numbers = true)]
    max_flows_weight: f64,

    /// Only report this fund
    #[arg(long)]
    fund: Option<String>,

    /// Print a JSON array instead of a table
    #[arg(long)]
    json: bool,
}

fn pct(rate: f64) -> String {
    if rate.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.4}%", rate * 100.0)
    }
}

fn print_table(reports: &[ReturnsReport]) {
    println!("{:<12} {:>10} {:>10} {:>5} {:>11} {:>11} {:>11} {:>11}",
        "Fund", "Start", "End", "Obs", "TWR", "MWR", "MWR(clip)", "MWR(inv)");
    println!("{}", "-".repeat(90));

    for r in reports {
        println!("{:<12} {:>10} {:>10} {:>5} {:>11} {:>11} {:>11} {:>11}",
            r.fund_id,
            r.start_date,
            r.end_date,
            r.observations,
            pct(r.twr),
            pct(r.mwr),
            pct(r.theoretical_mwr),
            pct(r.theoretical_mwr_inverted),
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut histories = load_histories(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;

    if let Some(ref fund) = cli.fund {
        histories.retain(|h| &h.fund_id == fund);
        if histories.is_empty() {
            bail!("fund {} not found in {}", fund, cli.input.display());
        }
    }

    let runner = PortfolioRunner::new(MetricsConfig::with_max_flows_weight(cli.max_flows_weight));
    let (reports, failures) = runner.run_batch_partitioned(&histories);
    for e in &failures {
        eprintln!("error: {}", e);
    }
    if reports.is_empty() && !failures.is_empty() {
        bail!("no fund could be evaluated");
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_table(&reports);
    }

    Ok(())
}
