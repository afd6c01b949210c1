//! Configuration validation.
//!
//! Validates all config fields before an assessment runs, and builds the
//! [`AssessConfig`] once they pass.

use crate::domain::aligner::Calendar;
use crate::domain::allocation::parse_allocation;
use crate::domain::assess::AssessConfig;
use crate::domain::date_range::DateRange;
use crate::domain::error::AssessError;
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DATA_SOURCES: &[&str] = &["csv", "sqlite"];

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), AssessError> {
    let source = data_source(config);
    match source.as_str() {
        "csv" => require(config, "data", "dir").map(|_| ()),
        "sqlite" => require(config, "data", "path").map(|_| ()),
        _ => Err(AssessError::ConfigInvalid {
            section: "data".to_string(),
            key: "source".to_string(),
            reason: format!("unknown source '{source}', expected one of {DATA_SOURCES:?}"),
        }),
    }
}

pub fn validate_assess_config(config: &dyn ConfigPort) -> Result<(), AssessError> {
    validate_dates(config)?;
    validate_symbols(config)?;
    validate_start_value(config)?;
    validate_samples_per_year(config)?;
    Ok(())
}

/// Data source name, lower-cased. Defaults to `csv`.
pub fn data_source(config: &dyn ConfigPort) -> String {
    config
        .get_non_empty("data", "source")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "csv".to_string())
}

pub fn build_assess_config(config: &dyn ConfigPort) -> Result<AssessConfig, AssessError> {
    validate_assess_config(config)?;

    let range = DateRange::new(
        parse_date(config, "start_date")?,
        parse_date(config, "end_date")?,
    )?;
    let allocation = parse_allocation(&require(config, "portfolio", "symbols")?)?;
    let start_value = config.get_double("portfolio", "start_value", 0.0);

    let mut assess_config = AssessConfig::new(range, allocation, start_value);
    assess_config.samples_per_year =
        config.get_double("statistics", "samples_per_year", TRADING_DAYS_PER_YEAR);
    if let Some(reference) = config.get_non_empty("calendar", "reference") {
        assess_config.calendar = Calendar::Reference(reference.to_uppercase());
    }
    Ok(assess_config)
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, AssessError> {
    config
        .get_non_empty(section, key)
        .ok_or_else(|| AssessError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<NaiveDate, AssessError> {
    let value = require(config, "portfolio", field)?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| AssessError::ConfigInvalid {
        section: "portfolio".to_string(),
        key: field.to_string(),
        reason: format!("invalid {} format, expected YYYY-MM-DD", field),
    })
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), AssessError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    if start_date > end_date {
        return Err(AssessError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must not be after end_date".to_string(),
        });
    }
    Ok(())
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), AssessError> {
    let raw = require(config, "portfolio", "symbols")?;
    parse_allocation(&raw)
        .map(|_| ())
        .map_err(|e| AssessError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "symbols".to_string(),
            reason: e.to_string(),
        })
}

fn validate_start_value(config: &dyn ConfigPort) -> Result<(), AssessError> {
    require(config, "portfolio", "start_value")?;
    let value = config.get_double("portfolio", "start_value", f64::NAN);
    if !(value.is_finite() && value > 0.0) {
        return Err(AssessError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "start_value".to_string(),
            reason: "start_value must be a positive number".to_string(),
        });
    }
    Ok(())
}

fn validate_samples_per_year(config: &dyn ConfigPort) -> Result<(), AssessError> {
    let value = config.get_double("statistics", "samples_per_year", TRADING_DAYS_PER_YEAR);
    if !(value.is_finite() && value > 0.0) {
        return Err(AssessError::ConfigInvalid {
            section: "statistics".to_string(),
            key: "samples_per_year".to_string(),
            reason: "samples_per_year must be positive".to_string(),
        });
    }
    Ok(())
}
