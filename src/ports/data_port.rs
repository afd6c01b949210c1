//! Price data access port trait.

use crate::domain::error::AssessError;
use crate::domain::price::PriceBar;
use chrono::NaiveDate;

/// A source of daily adjusted-close prices.
pub trait PriceDataPort {
    /// Rows for `symbol` dated within `[start_date, end_date]`, oldest first.
    ///
    /// Fails with [`AssessError::DataUnavailable`] when the source has never
    /// heard of the symbol.
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, AssessError>;

    fn list_symbols(&self) -> Result<Vec<String>, AssessError>;

    /// First date, last date and row count held for `symbol`.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AssessError>;
}
