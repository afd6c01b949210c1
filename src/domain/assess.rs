//! End-to-end portfolio assessment: align prices, build the value series,
//! derive statistics.
//!
//! Every call is self-contained. Nothing is cached between calls, so
//! independent assessments may run on separate threads as long as the data
//! port allows it.

use crate::domain::aligner::{Calendar, PriceAligner};
use crate::domain::allocation::Allocation;
use crate::domain::date_range::DateRange;
use crate::domain::error::AssessError;
use crate::domain::metrics::{PortfolioStatistics, TRADING_DAYS_PER_YEAR};
use crate::domain::portfolio::PortfolioValueSeries;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AssessConfig {
    pub range: DateRange,
    pub allocation: Allocation,
    pub start_value: f64,
    pub samples_per_year: f64,
    pub calendar: Calendar,
}

impl AssessConfig {
    pub fn new(range: DateRange, allocation: Allocation, start_value: f64) -> Self {
        Self {
            range,
            allocation,
            start_value,
            samples_per_year: TRADING_DAYS_PER_YEAR,
            calendar: Calendar::Intersection,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Assessment {
    pub series: PortfolioValueSeries,
    pub daily_returns: Vec<f64>,
    pub statistics: PortfolioStatistics,
}

pub fn assess_portfolio(
    data_port: &dyn PriceDataPort,
    config: &AssessConfig,
) -> Result<Assessment, AssessError> {
    if !(config.start_value.is_finite() && config.start_value > 0.0) {
        return Err(AssessError::invalid(format!(
            "start value must be positive, got {}",
            config.start_value
        )));
    }

    let symbols: Vec<&str> = config.allocation.symbols().collect();
    let prices = PriceAligner::new(data_port)
        .with_calendar(config.calendar.clone())
        .fetch_prices(&symbols, &config.range)?;

    info!(
        symbols = symbols.len(),
        dates = prices.len(),
        range = %config.range,
        "assessing portfolio"
    );

    let series = PortfolioValueSeries::compute(&prices, &config.allocation, config.start_value)?;
    drop(prices);

    let statistics = PortfolioStatistics::compute_with_frequency(&series, config.samples_per_year)?;
    let daily_returns = series.daily_returns();

    Ok(Assessment {
        series,
        daily_returns,
        statistics,
    })
}

/// Evaluate a buy-and-hold portfolio from parallel symbol and allocation
/// slices, using the intersection calendar and 252 samples per year.
pub fn evaluate<S: AsRef<str>>(
    data_port: &dyn PriceDataPort,
    start_date: NaiveDate,
    end_date: NaiveDate,
    symbols: &[S],
    allocations: &[f64],
    start_value: f64,
) -> Result<PortfolioStatistics, AssessError> {
    let range = DateRange::new(start_date, end_date)?;
    let allocation = Allocation::from_parts(symbols, allocations)?;
    let config = AssessConfig::new(range, allocation, start_value);
    assess_portfolio(data_port, &config).map(|a| a.statistics)
}
