//! Declarative aggregation expressions.
//!
//! An expression is a small tree decoded once from configuration. Only two
//! operations exist: summing table columns and subtracting two
//! sub-expressions. Malformed trees are rejected at decode time, so
//! evaluation cannot fail.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::schema::{Record, Table};

/// A column of one of the two ledger tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceRef {
    /// Source table.
    pub table: Table,
    /// Column summed across every row of the table.
    pub field: String,
}

/// Aggregation expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expression {
    /// Sum of every listed column over all rows of its table.
    Sum {
        /// Columns to sum. An empty list sums to zero.
        #[serde(default)]
        sources: Vec<SourceRef>,
    },
    /// `left - right`.
    Subtract {
        /// Minuend.
        left: Box<Expression>,
        /// Subtrahend.
        right: Box<Expression>,
    },
}

impl Expression {
    /// Evaluates the expression against the two tables.
    ///
    /// A column absent from a row, or holding text that is not a number,
    /// contributes zero.
    #[must_use]
    pub fn evaluate(&self, purchases: &[Record], sales: &[Record]) -> Decimal {
        match self {
            Self::Sum { sources } => sources
                .iter()
                .map(|source| {
                    let rows = match source.table {
                        Table::Purchases => purchases,
                        Table::Sales => sales,
                    };
                    rows.iter().map(|row| row.decimal(&source.field)).sum::<Decimal>()
                })
                .sum(),
            Self::Subtract { left, right } => {
                left.evaluate(purchases, sales) - right.evaluate(purchases, sales)
            }
        }
    }

    /// Every column the expression reads, depth first.
    #[must_use]
    pub fn sources(&self) -> Vec<&SourceRef> {
        match self {
            Self::Sum { sources } => sources.iter().collect(),
            Self::Subtract { left, right } => {
                let mut all = left.sources();
                all.extend(right.sources());
                all
            }
        }
    }
}
