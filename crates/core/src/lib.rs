//! Core filing engine for the VAT tool.
//!
//! This crate turns a ledger export into the monthly VAT filing set. It has
//! no web, database or async dependencies; the only I/O is reading the
//! configuration directory and writing the rendered files.
//!
//! # Modules
//!
//! - `ledger` - Ledger CSV normalization
//! - `mapping` - Tag-driven redistribution into purchase and sales rows
//! - `declaration` - Declaration (deklar) aggregation rules
//! - `trade` - Intra-community trade declaration (VIES)
//! - `schema` - Output schemas and schema-shaped records
//! - `codec` - Fixed-width and delimited serialization
//! - `config` - JSON configuration set loading and cross-checks
//! - `pipeline` - End-to-end run, output bundle and run summary
//! - `warning` - Non-fatal findings

pub mod codec;
pub mod config;
pub mod declaration;
pub mod ledger;
pub mod mapping;
pub mod pipeline;
pub mod schema;
pub mod trade;
pub mod warning;

pub use config::EngineConfig;
pub use pipeline::{EngineError, FilingContext, OutputBundle, RunSummary, TaxReturn};
pub use warning::{Warning, Warnings};
