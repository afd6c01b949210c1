//! Daily adjusted-close price observation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub symbol: String,
    pub date: NaiveDate,
    /// `None` when the provider has a row for the date but no usable value.
    pub adj_close: Option<f64>,
}

impl PriceBar {
    pub fn new(symbol: &str, date: NaiveDate, adj_close: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            date,
            adj_close: Some(adj_close).filter(|p| p.is_finite()),
        }
    }

    pub fn missing(symbol: &str, date: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_string(),
            date,
            adj_close: None,
        }
    }

    pub fn has_price(&self) -> bool {
        self.adj_close.is_some()
    }
}

/// Parse a raw provider value; blanks and `nan`/`null` markers are missing.
pub fn parse_price(raw: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" | "nan" | "null" | "na" | "n/a" => Ok(None),
        _ => {
            let value: f64 = trimmed.parse()?;
            Ok(Some(value).filter(|v| v.is_finite()))
        }
    }
}
