//! Fund Returns - Money-weighted and time-weighted return analytics
//!
//! This library provides:
//! - Flow estimation from NAV/AUM divergence
//! - XIRR over irregularly dated cashflows (secant with Brent fallback)
//! - Realized and counterfactual (clipped / inverted flow) money-weighted returns
//! - Closed-form time-weighted returns
//! - CSV loading and parallel batch evaluation of many funds

pub mod error;
pub mod series;
pub mod returns;
pub mod runner;

// Re-export commonly used types
pub use error::{ReturnsError, SolveError};
pub use series::{FundHistory, TimeSeries};
pub use returns::{
    money_weighted_return_annualized, theoretical_mwr_annualized,
    theoretical_mwr_annualized_with_inverted_flows, time_weighted_return_annualized,
    MetricsConfig, ReturnsEngine, ReturnsReport, SolverConfig,
};
pub use runner::PortfolioRunner;
