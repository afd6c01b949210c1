//! Date-aligned price table shared by every symbol in a portfolio.

use crate::domain::error::AssessError;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    columns: Vec<Vec<f64>>,
    symbol_index: HashMap<String, usize>,
}

impl PriceTable {
    /// Build a table from a date axis and one price column per symbol.
    ///
    /// Dates must be strictly increasing, every column must cover every date,
    /// and every price must be finite and positive.
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, AssessError> {
        if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(AssessError::invalid(format!(
                "price table dates not strictly increasing at {}",
                w[1]
            )));
        }

        let mut symbols = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());
        let mut symbol_index = HashMap::with_capacity(columns.len());

        for (symbol, column) in columns {
            if column.len() != dates.len() {
                return Err(AssessError::invalid(format!(
                    "{symbol}: {} prices for {} dates",
                    column.len(),
                    dates.len()
                )));
            }
            if let Some((i, price)) = column
                .iter()
                .enumerate()
                .find(|(_, p)| !(p.is_finite() && **p > 0.0))
            {
                return Err(AssessError::data_source(format!(
                    "{symbol}: non-positive price {price} on {}",
                    dates[i]
                )));
            }
            if symbol_index.insert(symbol.clone(), symbols.len()).is_some() {
                return Err(AssessError::invalid(format!("duplicate symbol: {symbol}")));
            }
            symbols.push(symbol);
            values.push(column);
        }

        Ok(Self {
            dates,
            symbols,
            columns: values,
            symbol_index,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.symbol_index
            .get(symbol)
            .map(|&i| self.columns[i].as_slice())
    }

    pub fn price(&self, symbol: &str, date: NaiveDate) -> Option<f64> {
        let row = self.dates.binary_search(&date).ok()?;
        self.column(symbol).map(|c| c[row])
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}
