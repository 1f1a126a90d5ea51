//! Money-weighted and time-weighted return calculations

mod flows;
mod irr;
mod mwr;
mod counterfactual;
mod twr;
mod engine;
mod report;

pub use flows::{estimate_flows, EstimatedFlows};
pub use irr::{npv, solve_root, xirr, SolverConfig, BRACKET_LOWER, BRACKET_UPPER};
pub use mwr::investor_cashflows;
pub use counterfactual::{simulate_counterfactual, FlowPolicy, SimulatedPath, DEFAULT_MAX_FLOWS_WEIGHT};
pub use engine::{ReturnsEngine, MetricsConfig};
pub use report::ReturnsReport;

use crate::error::ReturnsResult;
use crate::series::TimeSeries;

/// Annualized money-weighted return with default solver settings.
///
/// `Ok(NaN)` when the investor cashflows have no sign change.
pub fn money_weighted_return_annualized(
    nav: &TimeSeries,
    aum: &TimeSeries,
    flows: Option<&TimeSeries>,
) -> ReturnsResult<f64> {
    ReturnsEngine::default().money_weighted_return(nav, aum, flows)
}

/// Annualized MWR with flow weights clipped to `±|max_flows_weight|`
pub fn theoretical_mwr_annualized(nav: &TimeSeries, aum: &TimeSeries, max_flows_weight: f64) -> ReturnsResult<f64> {
    ReturnsEngine::new(MetricsConfig::with_max_flows_weight(max_flows_weight)).theoretical_mwr(nav, aum)
}

/// Annualized MWR had the (clipped) inflows been outflows and vice versa
pub fn theoretical_mwr_annualized_with_inverted_flows(
    nav: &TimeSeries,
    aum: &TimeSeries,
    max_flows_weight: f64,
) -> ReturnsResult<f64> {
    ReturnsEngine::new(MetricsConfig::with_max_flows_weight(max_flows_weight))
        .theoretical_mwr_with_inverted_flows(nav, aum)
}

/// Annualized time-weighted return from first and last NAV
pub fn time_weighted_return_annualized(nav: &TimeSeries) -> f64 {
    twr::time_weighted_return(nav)
}
