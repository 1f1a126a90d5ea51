//! Counterfactual ("what-if") money-weighted returns
//!
//! The estimated flow weights are clipped to `[-max, max]` and replayed
//! against the NAV returns to build a synthetic AUM path, whose MWR is then
//! computed with the synthetic flows. Weights, not amounts, are replayed.

use super::flows::estimate_flows;
use super::irr::SolverConfig;
use super::mwr::money_weighted_return;
use crate::error::{ReturnsError, ReturnsResult};
use crate::series::TimeSeries;
use serde::{Deserialize, Serialize};

/// Default cap on the absolute flow weight per period
pub const DEFAULT_MAX_FLOWS_WEIGHT: f64 = 0.3;

/// How the clipped flow weights are turned into synthetic flows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowPolicy {
    /// Flows as estimated, with weights clipped
    Clipped,
    /// Inflows become outflows and vice versa
    Inverted,
}

impl FlowPolicy {
    /// Synthetic flow for a period given its weight and the prior AUM
    fn flow(self, weight: f64, previous_aum: f64) -> f64 {
        match self {
            FlowPolicy::Clipped => weight * previous_aum,
            FlowPolicy::Inverted => weight * previous_aum * -1.0,
        }
    }
}

/// Synthetic AUM and flows built by the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPath {
    pub aum: TimeSeries,
    pub flows: TimeSeries,
}

/// Replay clipped flow weights against NAV returns under `policy`
pub fn simulate_counterfactual(
    nav: &TimeSeries,
    aum: &TimeSeries,
    max_flows_weight: f64,
    policy: FlowPolicy,
) -> ReturnsResult<SimulatedPath> {
    if max_flows_weight.is_nan() {
        return Err(ReturnsError::InvalidParameter {
            name: "max_flows_weight",
            value: max_flows_weight,
        });
    }
    if !nav.is_aligned_with(aum) {
        return Err(ReturnsError::MisalignedSeries { series: "aum" });
    }

    let max_weight = max_flows_weight.abs();
    let nav_returns: Vec<f64> = nav.pct_change().iter().map(|r| r + 1.0).collect();

    let estimated = estimate_flows(nav, aum);
    let weights: Vec<f64> = estimated
        .weight
        .values()
        .iter()
        .map(|&w| if w.is_nan() { w } else { w.clamp(-max_weight, max_weight) })
        .collect();

    let mut sim_aum = aum.values().to_vec();
    let mut sim_flows = estimated.amount.values().to_vec();

    for i in 1..sim_aum.len() {
        sim_flows[i] = policy.flow(weights[i], sim_aum[i - 1]);
        sim_aum[i] = sim_aum[i - 1] * nav_returns[i] + sim_flows[i];
    }

    Ok(SimulatedPath {
        aum: aum.with_values(sim_aum),
        flows: aum.with_values(sim_flows),
    })
}

/// MWR of the synthetic path produced by `policy`
pub fn counterfactual_mwr(
    nav: &TimeSeries,
    aum: &TimeSeries,
    max_flows_weight: f64,
    policy: FlowPolicy,
    solver: &SolverConfig,
) -> ReturnsResult<f64> {
    let path = simulate_counterfactual(nav, aum, max_flows_weight, policy)?;
    money_weighted_return(nav, &path.aum, Some(&path.flows), solver)
}
