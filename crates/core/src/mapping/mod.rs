//! Tag-driven redistribution of ledger rows.
//!
//! This module implements the mapping step:
//! - Mapping configuration (tag rules, amount source, derived totals)
//! - The mapping service with collision detection
//! - Error types for the mapping step

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod mapping_props;

pub use error::MappingError;
pub use service::{MappingService, normalize_document_type};
pub use types::{
    AmountSource, DerivedTotal, DocumentNumberSources, MappingResult, Sign, TagRule, Target,
    TaxGridMapping, UNIDENTIFIED_COUNTERPARTY_VAT,
};
