//! End-to-end filing run.
//!
//! This module ties the steps together:
//! - `TaxReturn::build`: single-period check, mapping, declaration and
//!   trade declaration
//! - `TaxReturn::render`: all output files, in memory
//! - `OutputBundle::write_to`: the only step touching the file system
//! - `RunSummary`: counts and warnings as plain text

pub mod error;
pub mod output;
pub mod summary;
pub mod tax_return;

pub use error::EngineError;
pub use output::{OutputBundle, OutputFile};
pub use summary::{RunSummary, SUMMARY_WARNING_LIMIT};
pub use tax_return::{FilingContext, TaxReturn};
