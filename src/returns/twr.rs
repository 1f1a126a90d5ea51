//! Time-weighted return (TWR)

use crate::series::{TimeSeries, DAYS_PER_YEAR};

/// Annualized TWR from the first and last NAV.
///
/// NaN when the series spans no time.
pub fn time_weighted_return(nav: &TimeSeries) -> f64 {
    let days = nav.span_days();
    if days <= 0 {
        return f64::NAN;
    }

    let annual_factor = DAYS_PER_YEAR / days as f64;
    (nav.last_value() / nav.first_value()).powf(annual_factor) - 1.0
}
