//! Portfolio value series built from a fixed initial allocation.

use crate::domain::allocation::Allocation;
use crate::domain::error::AssessError;
use crate::domain::price_table::PriceTable;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioValueSeries {
    points: Vec<ValuePoint>,
}

impl PortfolioValueSeries {
    /// Buy-and-hold value of `start_value` split across `allocation` on the
    /// first date of `prices`.
    ///
    /// value[t] = Σ_s (price[s][t] / price[s][0]) × alloc[s] × start_value,
    /// summed in allocation order. Weights are not renormalized.
    pub fn compute(
        prices: &PriceTable,
        allocation: &Allocation,
        start_value: f64,
    ) -> Result<Self, AssessError> {
        if !(start_value.is_finite() && start_value > 0.0) {
            return Err(AssessError::invalid(format!(
                "start value must be positive, got {start_value}"
            )));
        }
        if prices.is_empty() {
            return Err(AssessError::invalid("price table has no dates"));
        }

        let mut values = vec![0.0_f64; prices.len()];
        for (symbol, weight) in allocation.iter() {
            let column = prices
                .column(symbol)
                .ok_or_else(|| AssessError::DataUnavailable {
                    symbol: symbol.to_string(),
                })?;
            let base = column[0];
            for (value, &price) in values.iter_mut().zip(column) {
                *value += price / base * weight * start_value;
            }
        }

        let points = prices
            .dates()
            .iter()
            .zip(values)
            .map(|(&date, value)| ValuePoint { date, value })
            .collect();
        Ok(Self { points })
    }

    pub fn from_points(points: Vec<ValuePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ValuePoint] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&ValuePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&ValuePoint> {
        self.points.last()
    }

    /// value[t] / value[t-1] - 1 for t >= 1. The first date has no return.
    pub fn daily_returns(&self) -> Vec<f64> {
        self.points
            .windows(2)
            .map(|w| w[1].value / w[0].value - 1.0)
            .collect()
    }
}
