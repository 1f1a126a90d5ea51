//! Per-fund output of a return calculation run

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Annualized returns for one fund. Undefined rates are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsReport {
    pub fund_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub observations: usize,

    /// Flow-weight cap used by the two counterfactual MWRs
    pub max_flows_weight: f64,

    pub twr: f64,
    pub mwr: f64,
    pub theoretical_mwr: f64,
    pub theoretical_mwr_inverted: f64,
}

impl ReturnsReport {
    /// MWR minus TWR: positive when flows were well timed
    pub fn timing_effect(&self) -> f64 {
        self.mwr - self.twr
    }

    /// Realized MWR minus the MWR under inverted flows
    pub fn inversion_spread(&self) -> f64 {
        self.mwr - self.theoretical_mwr_inverted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::date;

    fn report() -> ReturnsReport {
        ReturnsReport {
            fund_id: "X".to_string(),
            start_date: date(2020, 1, 1),
            end_date: date(2021, 1, 1),
            observations: 2,
            max_flows_weight: 0.3,
            twr: 0.05,
            mwr: 0.07,
            theoretical_mwr: 0.06,
            theoretical_mwr_inverted: f64::NAN,
        }
    }

    #[test]
    fn test_spreads() {
        let r = report();
        assert!((r.timing_effect() - 0.02).abs() < 1e-12);
        assert!(r.inversion_spread().is_nan());
    }

    #[test]
    fn test_json_writes_nan_as_null() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["fund_id"], "X");
        assert_eq!(json["start_date"], "2020-01-01");
        assert!(json["theoretical_mwr_inverted"].is_null());
    }
}
