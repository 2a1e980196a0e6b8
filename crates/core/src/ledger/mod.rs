//! Ledger input handling.
//!
//! This module implements the input side of a filing run:
//! - Column mapping from semantic keys to raw CSV headers
//! - Date parsing modes
//! - Normalization of a ledger CSV export into typed rows
//! - Error types for ledger input

pub mod error;
pub mod normalize;
pub mod types;

pub use error::LedgerError;
pub use normalize::{LedgerNormalizer, parse_amount, parse_tags};
pub use types::{DOCUMENT_NUMBER_KEYS, DateMode, LedgerBatch, LedgerColumns, LedgerRow};
