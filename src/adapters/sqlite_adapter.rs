//! SQLite price adapter.

use crate::domain::error::AssessError;
use crate::domain::price::PriceBar;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn query_error(e: rusqlite::Error) -> AssessError {
    AssessError::data_source(e.to_string())
}

fn pool_error(e: r2d2::Error) -> AssessError {
    AssessError::data_source(e.to_string())
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AssessError> {
        let db_path =
            config
                .get_non_empty("data", "path")
                .ok_or_else(|| AssessError::ConfigMissing {
                    section: "data".into(),
                    key: "path".into(),
                })?;

        let raw_pool_size = config.get_int("data", "pool_size", 4);
        let pool_size = u32::try_from(raw_pool_size)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| AssessError::ConfigInvalid {
                section: "data".into(),
                key: "pool_size".into(),
                reason: format!("expected a positive connection count, got {raw_pool_size}"),
            })?;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, AssessError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, AssessError> {
        self.pool.get().map_err(pool_error)
    }

    pub fn initialize_schema(&self) -> Result<(), AssessError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS prices (
                    symbol TEXT NOT NULL,
                    date TEXT NOT NULL,
                    adj_close REAL,
                    PRIMARY KEY (symbol, date)
                );
                CREATE INDEX IF NOT EXISTS idx_prices_date ON prices(date);",
            )
            .map_err(query_error)
    }

    pub fn insert_bars(&self, bars: &[PriceBar]) -> Result<(), AssessError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        for bar in bars {
            tx.execute(
                "INSERT OR REPLACE INTO prices (symbol, date, adj_close) VALUES (?1, ?2, ?3)",
                params![bar.symbol, bar.date.format("%Y-%m-%d").to_string(), bar.adj_close],
            )
            .map_err(query_error)?;
        }

        tx.commit().map_err(query_error)
    }
}

fn parse_db_date(raw: &str) -> Result<NaiveDate, AssessError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| AssessError::data_source(format!("invalid date '{raw}': {e}")))
}

impl PriceDataPort for SqliteAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, AssessError> {
        let conn = self.conn()?;

        let known: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM prices WHERE symbol = ?1",
                params![symbol],
                |row| row.get(0),
            )
            .map_err(query_error)?;
        if known == 0 {
            return Err(AssessError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        }

        let start_str = start_date.format("%Y-%m-%d").to_string();
        let end_str = end_date.format("%Y-%m-%d").to_string();

        let mut stmt = conn
            .prepare(
                "SELECT date, adj_close FROM prices
                 WHERE symbol = ?1 AND date >= ?2 AND date <= ?3
                 ORDER BY date ASC",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![symbol, start_str, end_str], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<f64>>(1)?))
            })
            .map_err(query_error)?;

        let mut bars = Vec::new();
        for row in rows {
            let (date_str, adj_close) = row.map_err(query_error)?;
            bars.push(PriceBar {
                symbol: symbol.to_string(),
                date: parse_db_date(&date_str)?,
                adj_close: adj_close.filter(|p| p.is_finite()),
            });
        }

        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, AssessError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM prices ORDER BY symbol")
            .map_err(query_error)?;

        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_error)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_error)?);
        }

        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, AssessError> {
        let conn = self.conn()?;

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM prices WHERE symbol = ?1",
                params![symbol],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_error)?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => Ok(Some((
                parse_db_date(&min_str)?,
                parse_db_date(&max_str)?,
                count as usize,
            ))),
            _ => Ok(None),
        }
    }
}
