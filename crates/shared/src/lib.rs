//! Shared types and configuration for the VAT filing tool.
//!
//! This crate provides what every other crate needs:
//! - The `TaxPeriod` value type and its filing-format renderings
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
pub use types::TaxPeriod;
