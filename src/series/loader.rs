//! Load fund NAV/AUM histories from CSV
//!
//! Expected columns: `Date`, `NAV`, `AUM`, and optionally `Flows` and `FundID`.
//! Rows for several funds may be interleaved; they are grouped by `FundID`.
//! A fund whose rows do not form a valid history is logged and skipped; a row
//! that cannot be parsed at all fails the whole load.

use super::FundHistory;
use crate::error::ReturnsResult;
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use log::{info, warn};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Fund identifier used when the file carries no `FundID` column
pub const DEFAULT_FUND_ID: &str = "fund";

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "FundID", default)]
    fund_id: Option<String>,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "NAV")]
    nav: f64,
    #[serde(rename = "AUM")]
    aum: f64,
    #[serde(rename = "Flows", default)]
    flows: Option<f64>,
}

/// Rows collected for one fund, in file order
#[derive(Debug)]
struct FundRows {
    fund_id: String,
    rows: Vec<(NaiveDate, f64, f64, Option<f64>)>,
}

impl FundRows {
    fn into_history(mut self) -> ReturnsResult<FundHistory> {
        self.rows.sort_by_key(|row| row.0);

        let has_flows = self.rows.iter().any(|row| row.3.is_some());
        let dates = self.rows.iter().map(|row| row.0).collect();
        let nav = self.rows.iter().map(|row| row.1).collect();
        let aum = self.rows.iter().map(|row| row.2).collect();
        let flows = has_flows.then(|| self.rows.iter().map(|row| row.3.unwrap_or(0.0)).collect());

        FundHistory::new(self.fund_id.clone(), dates, nav, aum, flows)
            .map_err(|e| e.for_fund(&self.fund_id))
    }
}

/// Load all fund histories from a CSV file
pub fn load_histories<P: AsRef<Path>>(path: P) -> ReturnsResult<Vec<FundHistory>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let histories = load_histories_from_reader(file)?;
    info!("Loaded {} fund histories from {}", histories.len(), path.display());
    Ok(histories)
}

/// Load fund histories from any reader (e.g., string buffer, network stream)
pub fn load_histories_from_reader<R: Read>(reader: R) -> ReturnsResult<Vec<FundHistory>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut funds: Vec<FundRows> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        let fund_id = row
            .fund_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEFAULT_FUND_ID.to_string());

        let idx = *index.entry(fund_id).or_insert_with_key(|id| {
            funds.push(FundRows {
                fund_id: id.clone(),
                rows: Vec::new(),
            });
            funds.len() - 1
        });
        funds[idx].rows.push((row.date, row.nav, row.aum, row.flows));
    }

    let histories = funds
        .into_iter()
        .filter_map(|fund| match fund.into_history() {
            Ok(history) => Some(history),
            Err(e) => {
                warn!("Skipping {}", e);
                None
            }
        })
        .collect();

    Ok(histories)
}
