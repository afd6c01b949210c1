//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for assess.
#[derive(Debug, thiserror::Error)]
pub enum AssessError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("no price data for {symbol} in the requested range")]
    DataUnavailable { symbol: String },

    #[error("no common trading days between {start_date} and {end_date}")]
    EmptyCalendar {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },

    #[error("{statistic} is undefined: {reason}")]
    UndefinedStatistic {
        statistic: &'static str,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AssessError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        AssessError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn data_source(reason: impl Into<String>) -> Self {
        AssessError::DataSource {
            reason: reason.into(),
        }
    }

    /// Process exit status reported by the CLI for this error.
    pub fn exit_status(&self) -> u8 {
        match self {
            AssessError::Io(_) => 1,
            AssessError::InvalidInput { .. }
            | AssessError::ConfigParse { .. }
            | AssessError::ConfigMissing { .. }
            | AssessError::ConfigInvalid { .. } => 2,
            AssessError::DataSource { .. } => 3,
            AssessError::DataUnavailable { .. } | AssessError::EmptyCalendar { .. } => 5,
            AssessError::UndefinedStatistic { .. } => 6,
        }
    }
}

impl From<&AssessError> for std::process::ExitCode {
    fn from(err: &AssessError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
