//! Declaration rule and result types.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::expression::Expression;
use crate::schema::{Record, Table};
use crate::warning::Warnings;

/// Writes the value of an expression into a declaration field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldRule {
    /// Declaration field receiving the value.
    pub target_field: String,
    /// Expression evaluated against the ledger tables.
    pub expression: Expression,
}

/// Counts distinct documents of a table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentCountRule {
    /// Table whose rows are counted.
    pub source_table: Table,
    /// Fields whose text values form the document key.
    pub distinct_key_fields: Vec<String>,
}

/// Aggregation rules of the declaration record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeclarationRules {
    /// Field rules, applied in order.
    #[serde(default)]
    pub field_rules: Vec<FieldRule>,
    /// Document counts keyed by target field.
    #[serde(default)]
    pub document_count_rules: BTreeMap<String, DocumentCountRule>,
}

/// Run values copied into the declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationContext {
    /// Taxpayer (company) name.
    pub taxpayer_name: String,
    /// Person submitting the declaration.
    pub submitter_person: String,
}

/// Output of the declaration step.
#[derive(Debug, Clone)]
pub struct DeclarationResult {
    /// The declaration record.
    pub record: Record,
    /// Findings of the step.
    pub warnings: Warnings,
}
