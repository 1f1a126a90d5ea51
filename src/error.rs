//! Error types for series validation, loading and rate solving

use chrono::NaiveDate;
use thiserror::Error;

/// Failure of the root finder itself (after any fallback has been tried)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("bracket [{lower}, {upper}] does not contain a sign change")]
    NoSignChange { lower: f64, upper: f64 },

    #[error("{method} did not converge after {iterations} iterations")]
    NonConvergence {
        method: &'static str,
        iterations: usize,
    },

    #[error("rate {rate} leaves a residual of {residual}")]
    Residual { rate: f64, residual: f64 },

    #[error("{method} produced a non-finite value at rate {rate}")]
    NonFinite { method: &'static str, rate: f64 },
}

#[derive(Debug, Error)]
pub enum ReturnsError {
    #[error("series is empty")]
    EmptySeries,

    #[error("series has {dates} dates but {values} values")]
    LengthMismatch { dates: usize, values: usize },

    #[error("dates are not strictly increasing: {previous} followed by {current}")]
    UnsortedDates {
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("{series} is not aligned with the NAV date index")]
    MisalignedSeries { series: &'static str },

    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("fund {fund_id}: {source}")]
    Fund {
        fund_id: String,
        #[source]
        source: Box<ReturnsError>,
    },

    #[error(transparent)]
    Solver(#[from] SolveError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReturnsError {
    /// Attach a fund identifier to an error raised while processing that fund
    pub fn for_fund(self, fund_id: &str) -> Self {
        ReturnsError::Fund {
            fund_id: fund_id.to_string(),
            source: Box::new(self),
        }
    }
}

pub type ReturnsResult<T> = Result<T, ReturnsError>;
