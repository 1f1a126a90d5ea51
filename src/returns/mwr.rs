//! Money-weighted return (MWR)
//!
//! The MWR is the XIRR of the investor's cashflows: the initial AUM paid in,
//! every flow with its sign flipped, and the final AUM paid out.

use super::flows::estimate_flows;
use super::irr::{xirr, SolverConfig};
use crate::error::{ReturnsError, ReturnsResult};
use crate::series::TimeSeries;

/// Build the investor-perspective cashflow vector from fund flows and AUM
pub fn investor_cashflows(aum: &TimeSeries, flows: &TimeSeries) -> TimeSeries {
    let mut cashflows: Vec<f64> = flows.values().iter().map(|f| -f).collect();
    let last = cashflows.len() - 1;

    cashflows[0] = -aum.first_value();
    cashflows[last] += aum.last_value();

    flows.with_values(cashflows)
}

/// Annualized MWR of a fund.
///
/// When `flows` is `None` they are estimated from the NAV/AUM divergence.
/// Returns `Ok(NaN)` when the cashflows have no sign change.
pub fn money_weighted_return(
    nav: &TimeSeries,
    aum: &TimeSeries,
    flows: Option<&TimeSeries>,
    solver: &SolverConfig,
) -> ReturnsResult<f64> {
    if !nav.is_aligned_with(aum) {
        return Err(ReturnsError::MisalignedSeries { series: "aum" });
    }

    let estimated;
    let flows = match flows {
        Some(flows) => {
            if !nav.is_aligned_with(flows) {
                return Err(ReturnsError::MisalignedSeries { series: "flows" });
            }
            flows
        }
        None => {
            estimated = estimate_flows(nav, aum).amount;
            &estimated
        }
    };

    let cashflows = investor_cashflows(aum, flows);
    Ok(xirr(&cashflows, solver)?)
}
