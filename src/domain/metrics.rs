//! Portfolio statistics.

use super::error::AssessError;
use super::portfolio::PortfolioValueSeries;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioStatistics {
    pub cum_ret: f64,
    /// `None` when there are no daily returns (single-date series).
    pub avg_daily_ret: Option<f64>,
    /// `None` with fewer than two daily returns.
    pub stdev_daily_ret: Option<f64>,
    /// `None` when the standard deviation is undefined or zero.
    pub sharpe_ratio: Option<f64>,
    pub end_value: f64,
}

impl PortfolioStatistics {
    /// Statistics of `series`, annualizing Sharpe with `TRADING_DAYS_PER_YEAR`.
    pub fn compute(series: &PortfolioValueSeries) -> Result<Self, AssessError> {
        Self::compute_with_frequency(series, TRADING_DAYS_PER_YEAR)
    }

    /// Daily risk-free rate is zero; `samples_per_year` sets the Sharpe
    /// annualization factor `sqrt(samples_per_year)`.
    pub fn compute_with_frequency(
        series: &PortfolioValueSeries,
        samples_per_year: f64,
    ) -> Result<Self, AssessError> {
        if !(samples_per_year.is_finite() && samples_per_year > 0.0) {
            return Err(AssessError::invalid(format!(
                "samples_per_year must be positive, got {samples_per_year}"
            )));
        }
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) => (first.value, last.value),
            _ => return Err(AssessError::invalid("empty portfolio value series")),
        };

        let returns = series.daily_returns();
        let avg_daily_ret = mean(&returns);
        let stdev_daily_ret = sample_stddev(&returns);
        let sharpe_ratio = match (avg_daily_ret, stdev_daily_ret) {
            (Some(avg), Some(sd)) if sd != 0.0 => Some(samples_per_year.sqrt() * avg / sd),
            _ => None,
        };

        Ok(PortfolioStatistics {
            cum_ret: last / first - 1.0,
            avg_daily_ret,
            stdev_daily_ret,
            sharpe_ratio,
            end_value: last,
        })
    }

    pub fn require_avg_daily_ret(&self) -> Result<f64, AssessError> {
        self.avg_daily_ret
            .ok_or_else(|| AssessError::UndefinedStatistic {
                statistic: "avg_daily_ret",
                reason: "no daily return observations".into(),
            })
    }

    pub fn require_stdev_daily_ret(&self) -> Result<f64, AssessError> {
        self.stdev_daily_ret
            .ok_or_else(|| AssessError::UndefinedStatistic {
                statistic: "stdev_daily_ret",
                reason: "fewer than 2 daily return observations".into(),
            })
    }

    pub fn require_sharpe_ratio(&self) -> Result<f64, AssessError> {
        let sd = self.require_stdev_daily_ret()?;
        self.sharpe_ratio
            .ok_or_else(|| AssessError::UndefinedStatistic {
                statistic: "sharpe_ratio",
                reason: format!("division by standard deviation {sd}"),
            })
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Bessel-corrected standard deviation.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}
