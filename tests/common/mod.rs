#![allow(dead_code)]

use assess::domain::error::AssessError;
pub use assess::domain::price::PriceBar;
use assess::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::collections::HashMap;

pub struct MockPriceDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockPriceDataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, AssessError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(AssessError::DataSource {
                reason: reason.clone(),
            });
        }
        let bars = self
            .data
            .get(symbol)
            .ok_or_else(|| AssessError::DataUnavailable {
                symbol: symbol.to_string(),
            })?;
        Ok(bars
            .iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .cloned()
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, AssessError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AssessError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(AssessError::DataSource {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, date: &str, adj_close: f64) -> PriceBar {
    PriceBar::new(
        symbol,
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        adj_close,
    )
}

/// Weekday-only bars starting at `start_date`, following `closes`.
pub fn weekday_bars(symbol: &str, start_date: &str, closes: &[f64]) -> Vec<PriceBar> {
    use chrono::{Datelike, Weekday};

    let mut day = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    let mut bars = Vec::with_capacity(closes.len());
    for &close in closes {
        while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day = day.succ_opt().unwrap();
        }
        bars.push(PriceBar::new(symbol, day, close));
        day = day.succ_opt().unwrap();
    }
    bars
}

/// Deterministic wandering price path.
pub fn generate_closes(count: usize, start_price: f64, drift: f64, seed: u64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut price = start_price;
    (0..count)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let shock = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
            price *= 1.0 + drift + 0.02 * shock;
            price
        })
        .collect()
}

/// A four-symbol port with a year of weekday data from 2010-01-04.
pub fn sample_port() -> MockPriceDataPort {
    MockPriceDataPort::new()
        .with_bars(
            "GOOG",
            weekday_bars("GOOG", "2010-01-04", &generate_closes(260, 626.75, 0.0004, 1)),
        )
        .with_bars(
            "AAPL",
            weekday_bars("AAPL", "2010-01-04", &generate_closes(260, 210.73, 0.0010, 2)),
        )
        .with_bars(
            "GLD",
            weekday_bars("GLD", "2010-01-04", &generate_closes(260, 109.80, 0.0006, 3)),
        )
        .with_bars(
            "XOM",
            weekday_bars("XOM", "2010-01-04", &generate_closes(260, 64.55, -0.0002, 4)),
        )
}
