//! Price alignment: fetch every symbol, pick a common date axis, fill gaps.
//!
//! With [`Calendar::Intersection`] the axis is the set of dates on which the
//! provider returned a row for every requested symbol. With
//! [`Calendar::Reference`] the axis is the priced trading days of a reference
//! symbol (typically a broad index fund), and requested symbols are filled onto
//! it. In both modes a missing value is forward-filled first, then
//! back-filled, so a symbol that starts trading late takes its first known
//! price on the earlier dates.

use crate::domain::date_range::DateRange;
use crate::domain::error::AssessError;
use crate::domain::price::PriceBar;
use crate::domain::price_table::PriceTable;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Calendar {
    #[default]
    Intersection,
    Reference(String),
}

pub struct PriceAligner<'a> {
    data_port: &'a dyn PriceDataPort,
    calendar: Calendar,
}

type Series = BTreeMap<NaiveDate, Option<f64>>;

impl<'a> PriceAligner<'a> {
    pub fn new(data_port: &'a dyn PriceDataPort) -> Self {
        Self {
            data_port,
            calendar: Calendar::Intersection,
        }
    }

    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn fetch_prices<S: AsRef<str>>(
        &self,
        symbols: &[S],
        range: &DateRange,
    ) -> Result<PriceTable, AssessError> {
        if symbols.is_empty() {
            return Err(AssessError::invalid("empty symbol list"));
        }

        let mut series = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let symbol = symbol.as_ref();
            series.push((symbol.to_string(), self.fetch_series(symbol, range)?));
        }

        let axis = match &self.calendar {
            Calendar::Intersection => common_dates(&series),
            Calendar::Reference(reference) => {
                let reference_series = self.fetch_series(reference, range)?;
                reference_series
                    .into_iter()
                    .filter_map(|(date, price)| price.map(|_| date))
                    .collect()
            }
        };

        if axis.is_empty() {
            return Err(AssessError::EmptyCalendar {
                start_date: range.start_date(),
                end_date: range.end_date(),
            });
        }

        let mut columns = Vec::with_capacity(series.len());
        for (symbol, prices) in series {
            let mut values: Vec<Option<f64>> = axis
                .iter()
                .map(|date| prices.get(date).copied().flatten())
                .collect();

            let filled = fill_forward(&mut values) + fill_backward(&mut values);
            if filled > 0 {
                warn!(symbol = %symbol, filled, "filled missing prices");
            }

            let column: Option<Vec<f64>> = values.into_iter().collect();
            match column {
                Some(column) => columns.push((symbol, column)),
                None => return Err(AssessError::DataUnavailable { symbol }),
            }
        }

        let (first, last) = (axis[0], axis[axis.len() - 1]);
        debug!(
            symbols = columns.len(),
            dates = axis.len(),
            %first,
            %last,
            "aligned price table"
        );

        PriceTable::new(axis, columns)
    }

    fn fetch_series(&self, symbol: &str, range: &DateRange) -> Result<Series, AssessError> {
        let bars = self
            .data_port
            .fetch_prices(symbol, range.start_date(), range.end_date())?;
        debug!(symbol, rows = bars.len(), "fetched prices");

        let series = to_series(bars, range);
        if series.values().all(Option::is_none) {
            return Err(AssessError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        }
        Ok(series)
    }
}

/// When a date appears more than once, the first priced row wins.
fn to_series(bars: Vec<PriceBar>, range: &DateRange) -> Series {
    let mut series = Series::new();
    for bar in bars.into_iter().filter(|bar| range.contains(bar.date)) {
        let slot = series.entry(bar.date).or_insert(None);
        if slot.is_none() {
            *slot = bar.adj_close;
        }
    }
    series
}

fn common_dates(series: &[(String, Series)]) -> Vec<NaiveDate> {
    let Some(((_, first), rest)) = series.split_first() else {
        return Vec::new();
    };
    first
        .keys()
        .filter(|date| rest.iter().all(|(_, s)| s.contains_key(*date)))
        .copied()
        .collect()
}

/// Carry the last known value forward over gaps. Returns the number filled.
pub fn fill_forward(values: &mut [Option<f64>]) -> usize {
    let mut last = None;
    let mut filled = 0;
    for value in values.iter_mut() {
        match *value {
            Some(v) => last = Some(v),
            None if last.is_some() => {
                *value = last;
                filled += 1;
            }
            None => {}
        }
    }
    filled
}

/// Carry the next known value backward over leading gaps.
pub fn fill_backward(values: &mut [Option<f64>]) -> usize {
    let mut next = None;
    let mut filled = 0;
    for value in values.iter_mut().rev() {
        match *value {
            Some(v) => next = Some(v),
            None if next.is_some() => {
                *value = next;
                filled += 1;
            }
            None => {}
        }
    }
    filled
}
