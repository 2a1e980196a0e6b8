//! Engine error type.
//!
//! Wraps the per-step errors so a run has a single fatal error type with a
//! stable code.

use thiserror::Error;
use vattool_shared::TaxPeriod;

use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::ledger::LedgerError;
use crate::mapping::MappingError;

/// Fatal errors of a filing run.
#[derive(Debug, Error)]
pub enum EngineError {
    // ========== Step Errors ==========
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Ledger could not be normalized.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Ledger rows could not be mapped.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Output could not be rendered.
    #[error(transparent)]
    Codec(#[from] CodecError),

    // ========== Run Errors ==========
    /// The ledger does not cover exactly one tax period.
    #[error(
        "Input ledger must contain exactly one tax period; found {}: {}",
        .0.len(),
        .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    TaxPeriodCount(Vec<TaxPeriod>),

    /// An output file could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Target path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
}

impl EngineError {
    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Mapping(e) => e.error_code(),
            Self::Codec(e) => e.error_code(),
            Self::TaxPeriodCount(_) => "TAX_PERIOD_COUNT",
            Self::Write { .. } => "OUTPUT_WRITE",
        }
    }
}
