//! Implied cash flows from the divergence between AUM and NAV returns

use crate::series::TimeSeries;

/// Estimated flows: (+) inflows, (-) outflows. Position 0 of both series is
/// NaN since there is no prior period to compare against.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatedFlows {
    /// Flow amounts in currency units
    pub amount: TimeSeries,
    /// Flow as a fraction of the previous period's AUM
    pub weight: TimeSeries,
}

/// Estimate flows from aligned NAV and AUM series.
///
/// `weight[t] = aum_return[t] - nav_return[t]` and
/// `amount[t] = weight[t] * aum[t-1]`.
pub fn estimate_flows(nav: &TimeSeries, aum: &TimeSeries) -> EstimatedFlows {
    let nav_returns = nav.pct_change();
    let aum_returns = aum.pct_change();

    let weight: Vec<f64> = aum_returns
        .iter()
        .zip(&nav_returns)
        .map(|(a, n)| a - n)
        .collect();

    let aum_values = aum.values();
    let amount = weight
        .iter()
        .enumerate()
        .map(|(t, &w)| if t == 0 { f64::NAN } else { w * aum_values[t - 1] })
        .collect();

    EstimatedFlows {
        amount: aum.with_values(amount),
        weight: aum.with_values(weight),
    }
}
