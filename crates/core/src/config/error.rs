//! Configuration error types.
//!
//! This module defines all errors raised while loading and cross-checking
//! the JSON configuration set.

use thiserror::Error;

use crate::ledger::LedgerError;
use crate::schema::Table;

/// Errors that can occur while loading the configuration set.
#[derive(Debug, Error)]
pub enum ConfigError {
    // ========== Input Errors ==========
    /// A configuration file or directory could not be read.
    #[error("{path}: {source}")]
    Io {
        /// File or directory path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A configuration document is not valid JSON for its type.
    #[error("{path}: invalid configuration ({source})")]
    Json {
        /// Document origin.
        path: String,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// A document declares a version this build does not read.
    #[error("{path}: unsupported config_version={version}; supported version is {supported}")]
    UnsupportedVersion {
        /// Document origin.
        path: String,
        /// Declared version.
        version: u32,
        /// Supported version.
        supported: u32,
    },

    /// A configuration type is missing or duplicated.
    #[error("Expected exactly one '{config_type}' config, found {found}")]
    ConfigCount {
        /// `config_type` value.
        config_type: String,
        /// Number of documents found.
        found: usize,
    },

    // ========== Schema Errors ==========
    /// Two fields of one schema share an internal name.
    #[error("Schema '{schema}': duplicate schema field internal_name '{field}'")]
    DuplicateField {
        /// Schema name.
        schema: String,
        /// Duplicated internal name.
        field: String,
    },

    // ========== Mapping Errors ==========
    /// A tag lists the same target twice.
    #[error("Duplicate target (table={table}, amount_column={column}) in tags.{tag}.targets")]
    DuplicateTarget {
        /// Tag code.
        tag: String,
        /// Target table.
        table: Table,
        /// Target column.
        column: String,
    },

    /// A tag target names a column the table schema does not declare.
    #[error("tags.{tag} references unknown schema field '{column}' in table '{table}'")]
    UnknownTargetColumn {
        /// Tag code.
        tag: String,
        /// Target table.
        table: Table,
        /// Target column.
        column: String,
    },

    /// A derived total names a column the table schema does not declare.
    #[error("derived_totals references unknown schema field '{column}' in table '{table}'")]
    UnknownDerivedColumn {
        /// Table of the derived total.
        table: Table,
        /// Offending column.
        column: String,
    },

    // ========== Declaration Errors ==========
    /// A declaration rule writes a field the declaration schema does not declare.
    #[error("target_field '{0}' does not exist in deklar schema")]
    UnknownDeclarationField(String),

    /// A sum expression has no sources.
    #[error("Rule for '{0}': sources must be a non-empty list for sum")]
    EmptySum(String),

    /// An expression reads a column the table schema does not declare.
    #[error("Rule for '{target_field}' references unknown field '{field}' in table '{table}'")]
    UnknownSourceField {
        /// Declaration field of the rule.
        target_field: String,
        /// Source table.
        table: Table,
        /// Source column.
        field: String,
    },

    // ========== Trade Errors ==========
    /// The trade declaration amount field is not a numeric sales column.
    #[error("vies aggregation amount_field '{0}' is not a numeric field of the prodagbi schema")]
    UnknownTradeAmountField(String),

    // ========== Ledger Errors ==========
    /// The ledger column mapping is incomplete.
    #[error(transparent)]
    LedgerColumns(#[from] LedgerError),
}

impl ConfigError {
    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "CONFIG_IO",
            Self::Json { .. } => "CONFIG_INVALID_JSON",
            Self::UnsupportedVersion { .. } => "CONFIG_UNSUPPORTED_VERSION",
            Self::ConfigCount { .. } => "CONFIG_COUNT",
            Self::DuplicateField { .. } => "DUPLICATE_SCHEMA_FIELD",
            Self::DuplicateTarget { .. } => "DUPLICATE_TAG_TARGET",
            Self::UnknownTargetColumn { .. } => "UNKNOWN_TARGET_COLUMN",
            Self::UnknownDerivedColumn { .. } => "UNKNOWN_DERIVED_COLUMN",
            Self::UnknownDeclarationField(_) => "UNKNOWN_DECLARATION_FIELD",
            Self::EmptySum(_) => "EMPTY_SUM",
            Self::UnknownSourceField { .. } => "UNKNOWN_SOURCE_FIELD",
            Self::UnknownTradeAmountField(_) => "UNKNOWN_TRADE_AMOUNT_FIELD",
            Self::LedgerColumns(e) => e.error_code(),
        }
    }
}
