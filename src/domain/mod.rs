//! Core domain types and logic.

pub mod aligner;
pub mod allocation;
pub mod assess;
pub mod config_validation;
pub mod date_range;
pub mod error;
pub mod metrics;
pub mod portfolio;
pub mod price;
pub mod price_table;
