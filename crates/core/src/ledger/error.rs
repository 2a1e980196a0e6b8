//! Ledger error types for input normalization.
//!
//! This module defines all errors that can occur while reading a ledger
//! export: mapping errors, missing columns, and unparsable values.

use thiserror::Error;

/// Errors that can occur while normalizing a ledger export.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Mapping Errors ==========
    /// Required semantic keys are not mapped to CSV columns.
    #[error("ledger_columns is missing required mapping(s): {}", .0.join(", "))]
    MissingMapping(Vec<String>),

    /// Explicit date mode without a format.
    #[error("date_format must be provided when date_mode is 'explicit'")]
    MissingDateFormat,

    // ========== Column Errors ==========
    /// A mapped column is absent from the CSV header.
    #[error("Required column for {role} is missing: '{column}'")]
    MissingColumn {
        /// Semantic key of the column.
        role: String,
        /// Raw CSV header name.
        column: String,
    },

    /// The company VAT column is blank in every row.
    #[error("Required column '{0}' is present but all values are blank for company VAT")]
    BlankCompanyVat(String),

    // ========== Value Errors ==========
    /// A balance cell is not a decimal number.
    #[error("Row {row}: invalid balance value: '{value}'")]
    InvalidBalance {
        /// Source row index.
        row: usize,
        /// Raw cell content.
        value: String,
    },

    /// A per-tag amount cell is malformed.
    #[error("Row {row}: invalid tag amount entry: '{value}'")]
    InvalidTagAmount {
        /// Source row index.
        row: usize,
        /// Offending `tag=amount` entry.
        value: String,
    },

    /// Date cells could not be parsed.
    #[error(
        "Unable to parse date values in column '{column}'. First offending value(s): {}",
        .examples.iter().map(|v| format!("'{v}'")).collect::<Vec<_>>().join(", ")
    )]
    InvalidDate {
        /// Raw CSV header name.
        column: String,
        /// Up to three distinct offending values.
        examples: Vec<String>,
    },

    // ========== Input Errors ==========
    /// The CSV could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl LedgerError {
    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingMapping(_) => "MISSING_LEDGER_MAPPING",
            Self::MissingDateFormat => "MISSING_DATE_FORMAT",
            Self::MissingColumn { .. } => "MISSING_LEDGER_COLUMN",
            Self::BlankCompanyVat(_) => "BLANK_COMPANY_VAT",
            Self::InvalidBalance { .. } => "INVALID_BALANCE",
            Self::InvalidTagAmount { .. } => "INVALID_TAG_AMOUNT",
            Self::InvalidDate { .. } => "INVALID_DATE",
            Self::Csv(_) => "CSV_ERROR",
        }
    }
}
