//! Ordered symbol → weight allocation.
//!
//! Weights are used exactly as supplied. Nothing here renormalizes them: a
//! portfolio whose weights sum to 0.8 is 80% invested.

use crate::domain::error::AssessError;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    entries: Vec<(String, f64)>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AllocationError {
    #[error("empty symbol list")]
    Empty,

    #[error("empty token in allocation list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("{symbols} symbols but {weights} allocations")]
    LengthMismatch { symbols: usize, weights: usize },

    #[error("invalid weight for {symbol}: {raw}")]
    InvalidWeight { symbol: String, raw: String },
}

impl From<AllocationError> for AssessError {
    fn from(err: AllocationError) -> Self {
        AssessError::invalid(err.to_string())
    }
}

impl Allocation {
    /// Zip parallel symbol and weight slices, preserving order. Symbols are
    /// trimmed but otherwise kept as given.
    pub fn from_parts<S: AsRef<str>>(
        symbols: &[S],
        weights: &[f64],
    ) -> Result<Self, AllocationError> {
        if symbols.len() != weights.len() {
            return Err(AllocationError::LengthMismatch {
                symbols: symbols.len(),
                weights: weights.len(),
            });
        }
        let entries = symbols
            .iter()
            .zip(weights)
            .map(|(s, &w)| (s.as_ref().trim().to_string(), w))
            .collect();
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<(String, f64)>) -> Result<Self, AllocationError> {
        if entries.is_empty() {
            return Err(AllocationError::Empty);
        }
        let mut seen: HashSet<String> = HashSet::new();
        for (symbol, weight) in &entries {
            if symbol.is_empty() {
                return Err(AllocationError::EmptyToken);
            }
            if !seen.insert(symbol.clone()) {
                return Err(AllocationError::DuplicateSymbol(symbol.clone()));
            }
            if !weight.is_finite() {
                return Err(AllocationError::InvalidWeight {
                    symbol: symbol.clone(),
                    raw: weight.to_string(),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(s, _)| s.as_str())
    }

    pub fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|&(_, w)| w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(s, w)| (s.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn weight_sum(&self) -> f64 {
        self.weights().sum()
    }
}

/// Parse `GOOG:0.2, AAPL:0.3` into an allocation. Symbols are upper-cased.
pub fn parse_allocation(input: &str) -> Result<Allocation, AllocationError> {
    if input.trim().is_empty() {
        return Err(AllocationError::Empty);
    }

    let mut entries = Vec::new();
    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(AllocationError::EmptyToken);
        }
        let (symbol, raw_weight) = trimmed.split_once(':').ok_or_else(|| {
            AllocationError::InvalidWeight {
                symbol: trimmed.to_uppercase(),
                raw: String::new(),
            }
        })?;
        let symbol = symbol.trim().to_uppercase();
        let weight: f64 =
            raw_weight
                .trim()
                .parse()
                .map_err(|_| AllocationError::InvalidWeight {
                    symbol: symbol.clone(),
                    raw: raw_weight.trim().to_string(),
                })?;
        entries.push((symbol, weight));
    }

    Allocation::from_entries(entries)
}
