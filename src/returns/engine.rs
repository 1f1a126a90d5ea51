//! Configured return engine for a single fund history

use super::counterfactual::{counterfactual_mwr, FlowPolicy, DEFAULT_MAX_FLOWS_WEIGHT};
use super::irr::SolverConfig;
use super::mwr::money_weighted_return;
use super::report::ReturnsReport;
use super::twr::time_weighted_return;
use crate::error::ReturnsResult;
use crate::series::{FundHistory, TimeSeries};
use serde::{Deserialize, Serialize};

/// Configuration for a return calculation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Cap on the absolute flow weight used by the counterfactual MWRs
    pub max_flows_weight: f64,

    /// Root finder settings for every MWR
    pub solver: SolverConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            max_flows_weight: DEFAULT_MAX_FLOWS_WEIGHT,
            solver: SolverConfig::default(),
        }
    }
}

impl MetricsConfig {
    /// Default configuration with a different flow-weight cap
    pub fn with_max_flows_weight(max_flows_weight: f64) -> Self {
        Self {
            max_flows_weight,
            ..Self::default()
        }
    }
}

/// Main return engine
#[derive(Debug, Clone, Default)]
pub struct ReturnsEngine {
    config: MetricsConfig,
}

impl ReturnsEngine {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Realized annualized MWR; flows are estimated when not given
    pub fn money_weighted_return(
        &self,
        nav: &TimeSeries,
        aum: &TimeSeries,
        flows: Option<&TimeSeries>,
    ) -> ReturnsResult<f64> {
        money_weighted_return(nav, aum, flows, &self.config.solver)
    }

    /// MWR with flow weights clipped to the configured cap
    pub fn theoretical_mwr(&self, nav: &TimeSeries, aum: &TimeSeries) -> ReturnsResult<f64> {
        counterfactual_mwr(
            nav,
            aum,
            self.config.max_flows_weight,
            FlowPolicy::Clipped,
            &self.config.solver,
        )
    }

    /// MWR had every clipped inflow been an outflow and vice versa
    pub fn theoretical_mwr_with_inverted_flows(&self, nav: &TimeSeries, aum: &TimeSeries) -> ReturnsResult<f64> {
        counterfactual_mwr(
            nav,
            aum,
            self.config.max_flows_weight,
            FlowPolicy::Inverted,
            &self.config.solver,
        )
    }

    pub fn time_weighted_return(&self, nav: &TimeSeries) -> f64 {
        time_weighted_return(nav)
    }

    /// All four metrics for one fund
    pub fn report(&self, history: &FundHistory) -> ReturnsResult<ReturnsReport> {
        let nav = &history.nav;
        let aum = &history.aum;

        let compute = || -> ReturnsResult<ReturnsReport> {
            Ok(ReturnsReport {
                fund_id: history.fund_id.clone(),
                start_date: nav.first_date(),
                end_date: nav.last_date(),
                observations: history.len(),
                max_flows_weight: self.config.max_flows_weight.abs(),
                twr: self.time_weighted_return(nav),
                mwr: self.money_weighted_return(nav, aum, history.flows.as_ref())?,
                theoretical_mwr: self.theoretical_mwr(nav, aum)?,
                theoretical_mwr_inverted: self.theoretical_mwr_with_inverted_flows(nav, aum)?,
            })
        };

        compute().map_err(|e| e.for_fund(&history.fund_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::date;
    use approx::assert_relative_eq;

    fn history() -> FundHistory {
        let start = date(2020, 1, 1);
        let dates = [0, 182, 365]
            .iter()
            .map(|&d| start + chrono::Duration::days(d))
            .collect();
        FundHistory::new("P7", dates, vec![100.0, 105.0, 110.0], vec![1000.0, 1200.0, 1250.0], None).unwrap()
    }

    #[test]
    fn test_report() {
        let engine = ReturnsEngine::default();
        let report = engine.report(&history()).unwrap();

        assert_eq!(report.fund_id, "P7");
        assert_eq!(report.observations, 3);
        assert_eq!(report.start_date, date(2020, 1, 1));
        assert_relative_eq!(report.twr, 0.10, epsilon = 1e-12);
        assert!(report.mwr.is_finite());
        assert!(report.theoretical_mwr.is_finite());
        assert!(report.theoretical_mwr_inverted.is_finite());
    }

    #[test]
    fn test_cap_only_matters_when_binding() {
        // Weights here are 0.15 and ~-0.006, so a 0.3 cap never binds
        let h = history();
        let loose = ReturnsEngine::new(MetricsConfig::with_max_flows_weight(0.3));
        let looser = ReturnsEngine::new(MetricsConfig::with_max_flows_weight(5.0));
        let tight = ReturnsEngine::new(MetricsConfig::with_max_flows_weight(0.05));

        let a = loose.theoretical_mwr(&h.nav, &h.aum).unwrap();
        let b = looser.theoretical_mwr(&h.nav, &h.aum).unwrap();
        let c = tight.theoretical_mwr(&h.nav, &h.aum).unwrap();

        assert_eq!(a.to_bits(), b.to_bits());
        assert!((a - c).abs() > 1e-6);
    }

    #[test]
    fn test_deterministic() {
        let engine = ReturnsEngine::default();
        let h = history();
        let first = engine.report(&h).unwrap();
        let second = engine.report(&h).unwrap();
        assert_eq!(first.mwr.to_bits(), second.mwr.to_bits());
        assert_eq!(first.theoretical_mwr_inverted.to_bits(), second.theoretical_mwr_inverted.to_bits());
    }
}
