//! VAT declaration (deklar) aggregation.
//!
//! This module implements the declaration step:
//! - Aggregation expressions over the purchase and sales tables
//! - Field and document-count rules
//! - The declaration service, including the due/refundable recomputation

pub mod expression;
pub mod service;
pub mod types;

#[cfg(test)]
mod declaration_props;

pub use expression::{Expression, SourceRef};
pub use service::{DeclarationService, count_distinct};
pub use types::{
    DeclarationContext, DeclarationResult, DeclarationRules, DocumentCountRule, FieldRule,
};
