//! Batch runner for evaluating many funds at once
//!
//! Every fund is evaluated independently on its own copies of the data, so
//! batches fan out across threads with no coordination.

use crate::error::{ReturnsError, ReturnsResult};
use crate::returns::{MetricsConfig, ReturnsEngine, ReturnsReport};
use crate::series::FundHistory;
use log::warn;
use rayon::prelude::*;

/// Pre-configured runner for batch return calculations
///
/// # Example
/// ```ignore
/// let runner = PortfolioRunner::new(MetricsConfig::default());
/// let histories = load_histories("fund_history.csv")?;
/// for report in runner.run_batch(&histories).into_iter().flatten() {
///     println!("{}: {:.4}", report.fund_id, report.mwr);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PortfolioRunner {
    engine: ReturnsEngine,
}

impl PortfolioRunner {
    pub fn new(config: MetricsConfig) -> Self {
        Self {
            engine: ReturnsEngine::new(config),
        }
    }

    /// Evaluate a single fund
    pub fn run(&self, history: &FundHistory) -> ReturnsResult<ReturnsReport> {
        self.engine.report(history)
    }

    /// Evaluate many funds in parallel; output order matches input order
    pub fn run_batch(&self, histories: &[FundHistory]) -> Vec<ReturnsResult<ReturnsReport>> {
        histories
            .par_iter()
            .map(|history| {
                let result = self.engine.report(history);
                if let Err(ref e) = result {
                    warn!("Skipping {}: {}", history.fund_id, e);
                }
                result
            })
            .collect()
    }

    /// Evaluate many funds in parallel and split the outcome into the reports
    /// that succeeded and the errors of those that did not, each in input order
    pub fn run_batch_partitioned(&self, histories: &[FundHistory]) -> (Vec<ReturnsReport>, Vec<ReturnsError>) {
        let mut reports = Vec::with_capacity(histories.len());
        let mut failures = Vec::new();
        for result in self.run_batch(histories) {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => failures.push(e),
            }
        }
        (reports, failures)
    }

    /// Evaluate one fund under several flow-weight caps
    pub fn run_scenarios(&self, history: &FundHistory, max_flows_weights: &[f64]) -> Vec<ReturnsResult<ReturnsReport>> {
        max_flows_weights
            .iter()
            .map(|&max_flows_weight| {
                let config = MetricsConfig {
                    max_flows_weight,
                    ..self.engine.config().clone()
                };
                ReturnsEngine::new(config).report(history)
            })
            .collect()
    }

    pub fn config(&self) -> &MetricsConfig {
        self.engine.config()
    }
}
