//! CSV directory price adapter.
//!
//! One file per symbol, `<base_path>/<SYMBOL>.csv`, with a header row. The
//! `Date` column and an adjusted-close column (`Adj Close`, `adj_close`, or
//! failing those `Close`) are located by header name, so both full
//! OHLCV exports and two-column files work.

use crate::domain::error::AssessError;
use crate::domain::price::{parse_price, PriceBar};
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

const DATE_COLUMNS: &[&str] = &["date"];
const PRICE_COLUMNS: &[&str] = &["adj close", "adj_close", "adjclose", "close"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<PriceBar>, AssessError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AssessError::DataUnavailable {
                    symbol: symbol.to_string(),
                });
            }
            Err(e) => {
                return Err(AssessError::data_source(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| AssessError::data_source(format!("CSV parse error: {}", e)))?
            .clone();
        let date_col = find_column(&headers, DATE_COLUMNS).ok_or_else(|| {
            AssessError::data_source(format!("{}: missing date column", path.display()))
        })?;
        let price_col = find_column(&headers, PRICE_COLUMNS).ok_or_else(|| {
            AssessError::data_source(format!("{}: missing adjusted close column", path.display()))
        })?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| AssessError::data_source(format!("CSV parse error: {}", e)))?;

            let date_str = record.get(date_col).unwrap_or_default();
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                AssessError::data_source(format!("invalid date '{}': {}", date_str, e))
            })?;

            let raw = record.get(price_col).unwrap_or_default();
            let adj_close = parse_price(raw).map_err(|e| {
                AssessError::data_source(format!("invalid price '{}' on {}: {}", raw, date, e))
            })?;

            bars.push(PriceBar {
                symbol: symbol.to_string(),
                date,
                adj_close,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    candidates
        .iter()
        .find_map(|c| normalized.iter().position(|h| h == c))
}

impl PriceDataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, AssessError> {
        let mut bars = self.read_all(symbol)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, AssessError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            AssessError::data_source(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                AssessError::data_source(format!("directory entry error: {}", e))
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AssessError> {
        let bars = match self.read_all(symbol) {
            Ok(bars) => bars,
            Err(AssessError::DataUnavailable { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, bars.len()))),
            _ => Ok(None),
        }
    }
}
