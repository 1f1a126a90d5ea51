//! Date-indexed series and per-fund NAV/AUM histories

pub mod loader;

pub use loader::{load_histories, load_histories_from_reader};

use crate::error::{ReturnsError, ReturnsResult};
use chrono::NaiveDate;

/// Days per year used for every year-fraction conversion
pub const DAYS_PER_YEAR: f64 = 365.0;

/// A strictly increasing date index with one value per date.
///
/// Dates and values live in two contiguous buffers and are addressed by
/// position; derived series (returns, flows, simulated paths) share the same
/// positional layout as the series they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Build a series, checking that it is non-empty, that both buffers have
    /// the same length and that dates strictly increase.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> ReturnsResult<Self> {
        if dates.len() != values.len() {
            return Err(ReturnsError::LengthMismatch {
                dates: dates.len(),
                values: values.len(),
            });
        }
        if dates.is_empty() {
            return Err(ReturnsError::EmptySeries);
        }
        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ReturnsError::UnsortedDates {
                previous: pair[0],
                current: pair[1],
            });
        }

        Ok(Self { dates, values })
    }

    /// Build a series from a start date and day offsets
    pub fn from_day_offsets(start: NaiveDate, offsets: &[i64], values: Vec<f64>) -> ReturnsResult<Self> {
        let dates = offsets
            .iter()
            .map(|&days| start + chrono::Duration::days(days))
            .collect();
        Self::new(dates, values)
    }

    /// A new series on the same date index. Caller guarantees the length.
    pub(crate) fn with_values(&self, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), self.dates.len());
        Self {
            dates: self.dates.clone(),
            values,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn first_value(&self) -> f64 {
        self.values[0]
    }

    pub fn last_value(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Calendar days between the first and last observation
    pub fn span_days(&self) -> i64 {
        (self.last_date() - self.first_date()).num_days()
    }

    /// Period-over-period percent change; position 0 is NaN (no prior period)
    pub fn pct_change(&self) -> Vec<f64> {
        let mut changes = Vec::with_capacity(self.values.len());
        changes.push(f64::NAN);
        changes.extend(self.values.windows(2).map(|w| w[1] / w[0] - 1.0));
        changes
    }

    /// True when both series are indexed by exactly the same dates
    pub fn is_aligned_with(&self, other: &TimeSeries) -> bool {
        self.dates == other.dates
    }
}

/// Aligned NAV, AUM and optional explicit flows for a single fund
#[derive(Debug, Clone, PartialEq)]
pub struct FundHistory {
    pub fund_id: String,
    pub nav: TimeSeries,
    pub aum: TimeSeries,
    pub flows: Option<TimeSeries>,
}

impl FundHistory {
    /// Build a history from one shared date index
    pub fn new(
        fund_id: impl Into<String>,
        dates: Vec<NaiveDate>,
        nav: Vec<f64>,
        aum: Vec<f64>,
        flows: Option<Vec<f64>>,
    ) -> ReturnsResult<Self> {
        let nav = TimeSeries::new(dates, nav)?;
        let aum = TimeSeries::new(nav.dates.clone(), aum)?;
        let flows = match flows {
            Some(values) => Some(TimeSeries::new(nav.dates.clone(), values)?),
            None => None,
        };

        Ok(Self {
            fund_id: fund_id.into(),
            nav,
            aum,
            flows,
        })
    }

    /// Build a history from pre-built series, checking alignment
    pub fn from_series(
        fund_id: impl Into<String>,
        nav: TimeSeries,
        aum: TimeSeries,
        flows: Option<TimeSeries>,
    ) -> ReturnsResult<Self> {
        if !nav.is_aligned_with(&aum) {
            return Err(ReturnsError::MisalignedSeries { series: "aum" });
        }
        if let Some(ref flows) = flows {
            if !nav.is_aligned_with(flows) {
                return Err(ReturnsError::MisalignedSeries { series: "flows" });
            }
        }

        Ok(Self {
            fund_id: fund_id.into(),
            nav,
            aum,
            flows,
        })
    }

    pub fn len(&self) -> usize {
        self.nav.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nav.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_unsorted_dates() {
        let err = TimeSeries::new(
            vec![date(2024, 1, 2), date(2024, 1, 1)],
            vec![1.0, 2.0],
        )
        .unwrap_err();
        assert!(matches!(err, ReturnsError::UnsortedDates { .. }));

        let err = TimeSeries::new(
            vec![date(2024, 1, 1), date(2024, 1, 1)],
            vec![1.0, 2.0],
        )
        .unwrap_err();
        assert!(matches!(err, ReturnsError::UnsortedDates { .. }));
    }

    #[test]
    fn test_rejects_empty_and_mismatched() {
        assert!(matches!(
            TimeSeries::new(vec![], vec![]),
            Err(ReturnsError::EmptySeries)
        ));
        assert!(matches!(
            TimeSeries::new(vec![date(2024, 1, 1)], vec![1.0, 2.0]),
            Err(ReturnsError::LengthMismatch { dates: 1, values: 2 })
        ));
    }

    #[test]
    fn test_pct_change() {
        let series = TimeSeries::from_day_offsets(date(2024, 1, 1), &[0, 1, 2], vec![100.0, 110.0, 99.0]).unwrap();
        let changes = series.pct_change();

        assert!(changes[0].is_nan());
        assert_relative_eq!(changes[1], 0.10, epsilon = 1e-12);
        assert_relative_eq!(changes[2], -0.10, epsilon = 1e-12);
        assert_eq!(series.span_days(), 2);
    }

    #[test]
    fn test_history_alignment() {
        let nav = TimeSeries::from_day_offsets(date(2024, 1, 1), &[0, 30], vec![1.0, 1.1]).unwrap();
        let aum = TimeSeries::from_day_offsets(date(2024, 1, 1), &[0, 31], vec![10.0, 11.0]).unwrap();

        let err = FundHistory::from_series("F", nav.clone(), aum, None).unwrap_err();
        assert!(matches!(err, ReturnsError::MisalignedSeries { series: "aum" }));

        let history = FundHistory::new(
            "F",
            nav.dates().to_vec(),
            vec![1.0, 1.1],
            vec![10.0, 11.0],
            Some(vec![0.0, 0.5]),
        )
        .unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.flows.is_some());
    }
}
