//! Tag mapping configuration types.
//!
//! The mapping says, for every tax tag, which amount columns of which
//! output table the row amount lands in and with which sign.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::schema::{Record, Table};
use crate::warning::Warnings;

/// Direction a tag amount is written with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "i64")]
pub enum Sign {
    /// `+1`
    #[default]
    Plus,
    /// `-1`
    Minus,
}

impl Sign {
    /// Applies the sign to an amount.
    #[must_use]
    pub fn apply(self, amount: Decimal) -> Decimal {
        match self {
            Self::Plus => amount,
            Self::Minus => -amount,
        }
    }
}

impl TryFrom<i64> for Sign {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Plus),
            -1 => Ok(Self::Minus),
            other => Err(format!("invalid target sign {other}, expected 1 or -1")),
        }
    }
}

/// One destination of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Target {
    /// Output table.
    pub table: Table,
    /// Amount column of the table's schema.
    pub amount_column: String,
    /// Sign applied to the amount.
    #[serde(default)]
    pub sign: Sign,
}

/// Mapping entry of one tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TagRule {
    /// Free-form label.
    #[serde(default)]
    pub label: String,
    /// Destinations, possibly none.
    #[serde(default)]
    pub targets: Vec<Target>,
}

/// Where the amount of a tag comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountSource {
    /// The row's signed balance, for every tag on the row.
    #[default]
    RowBalance,
    /// The tag's own amount from the per-tag amount column.
    TagAmounts,
}

/// Document-number source keys, in priority order, per table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentNumberSources {
    /// Sources for purchase rows.
    #[serde(default = "default_purchase_sources")]
    pub pokupki: Vec<String>,
    /// Sources for sales rows.
    #[serde(default = "default_sales_sources")]
    pub prodagbi: Vec<String>,
}

fn default_purchase_sources() -> Vec<String> {
    ["purchase_doc_number", "purchase_ref", "document_number", "sales_move_name"]
        .map(String::from)
        .to_vec()
}

fn default_sales_sources() -> Vec<String> {
    ["sales_doc_number", "document_number", "sales_move_name", "purchase_ref"]
        .map(String::from)
        .to_vec()
}

impl Default for DocumentNumberSources {
    fn default() -> Self {
        Self {
            pokupki: default_purchase_sources(),
            prodagbi: default_sales_sources(),
        }
    }
}

impl DocumentNumberSources {
    /// Sources for a table.
    #[must_use]
    pub fn for_table(&self, table: Table) -> &[String] {
        match table {
            Table::Purchases => &self.pokupki,
            Table::Sales => &self.prodagbi,
        }
    }
}

/// A per-row total computed from other columns of the same row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DerivedTotal {
    /// Table the rule applies to.
    pub table: Table,
    /// Column that receives the total.
    pub target_field: String,
    /// Columns summed into the total.
    pub components: Vec<String>,
}

impl DerivedTotal {
    /// Sum of the component columns of a row.
    #[must_use]
    pub fn total(&self, record: &Record) -> Decimal {
        self.components.iter().map(|c| record.decimal(c)).sum()
    }
}

/// Placeholder VAT id for counterparties without one.
pub const UNIDENTIFIED_COUNTERPARTY_VAT: &str = "9999999999999";

fn default_unidentified_vat() -> String {
    UNIDENTIFIED_COUNTERPARTY_VAT.to_string()
}

/// The tax grid mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxGridMapping {
    /// Rules keyed by tag code.
    pub tags: BTreeMap<String, TagRule>,
    /// Amount source for every tag.
    #[serde(default)]
    pub amount_source: AmountSource,
    /// VAT id written for counterparties without one.
    #[serde(default = "default_unidentified_vat")]
    pub unidentified_counterparty_vat: String,
    /// Document-number resolution order.
    #[serde(default)]
    pub document_number_sources: DocumentNumberSources,
    /// Per-row totals applied after amounts are placed.
    #[serde(default)]
    pub derived_totals: Vec<DerivedTotal>,
}

impl TaxGridMapping {
    /// Rule for a tag, if the tag is mapped.
    #[must_use]
    pub fn rule(&self, tag: &str) -> Option<&TagRule> {
        self.tags.get(tag)
    }

    /// Derived-total rules of a table.
    pub fn derived_totals_for(&self, table: Table) -> impl Iterator<Item = &DerivedTotal> {
        self.derived_totals.iter().filter(move |rule| rule.table == table)
    }
}

/// Output of the mapping step.
#[derive(Debug, Clone, Default)]
pub struct MappingResult {
    /// Purchase ledger rows, in source order.
    pub purchases: Vec<Record>,
    /// Sales ledger rows, in source order.
    pub sales: Vec<Record>,
    /// Findings in row order.
    pub warnings: Warnings,
}

impl MappingResult {
    /// Rows of a table.
    #[must_use]
    pub fn table(&self, table: Table) -> &[Record] {
        match table {
            Table::Purchases => &self.purchases,
            Table::Sales => &self.sales,
        }
    }
}
