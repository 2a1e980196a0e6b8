//! Tag mapping service.
//!
//! Redistributes normalized ledger rows into the purchase and sales tables.
//! Every known tag on a row sends the row amount, signed, to each of its
//! target columns. Two different tags may never write the same column of
//! the same row; that is a configuration or bookkeeping error and aborts
//! the run.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::error::MappingError;
use super::types::{AmountSource, MappingResult, TaxGridMapping};
use crate::ledger::LedgerRow;
use crate::schema::{Record, SchemaSet, Table};
use crate::warning::{Warning, Warnings};

/// Signed amounts of one row, per table and column.
type RowAmounts<'a> = BTreeMap<Table, BTreeMap<&'a str, Decimal>>;

/// Tag mapping service.
pub struct MappingService;

impl MappingService {
    /// Maps ledger rows to purchase and sales rows.
    ///
    /// For each row:
    /// 1. Split tags into known and unknown; warn about unknown tags
    /// 2. Resolve the amount of every known tag
    /// 3. Apply known tags in sorted order, detecting collisions
    /// 4. Build one output row per touched table
    /// 5. Apply the table's derived totals
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Collision` when two tags write the same
    /// column of one row, or `MappingError::UnknownColumn` when a target
    /// names a column the table schema does not declare.
    pub fn map(
        rows: &[LedgerRow],
        mapping: &TaxGridMapping,
        schemas: &SchemaSet,
    ) -> Result<MappingResult, MappingError> {
        let mut result = MappingResult::default();

        for row in rows {
            // 1. Partition tags
            let (known, unknown): (Vec<&str>, Vec<&str>) = row
                .tags
                .iter()
                .map(String::as_str)
                .partition(|tag| mapping.rule(tag).is_some());

            if !unknown.is_empty() {
                result.warnings.push(Warning::UnknownTags {
                    row: row.index,
                    tags: unknown.iter().map(ToString::to_string).collect(),
                });
            }
            if known.is_empty() {
                continue;
            }

            if mapping.amount_source == AmountSource::RowBalance && row.balance.is_none() {
                tracing::debug!(row = row.index, "Row without balance skipped");
                continue;
            }

            // 2-3. Place amounts
            let amounts = Self::row_amounts(row, &known, mapping, &mut result.warnings)?;
            if amounts.is_empty() {
                continue;
            }

            // 4-5. Build output rows
            let document_type = Self::document_type(row, &mut result.warnings);
            for (table, values) in &amounts {
                let record = Self::build_row(row, *table, &document_type, values, mapping, schemas)?;
                match table {
                    Table::Purchases => result.purchases.push(record),
                    Table::Sales => result.sales.push(record),
                }
            }
        }

        tracing::debug!(
            purchases = result.purchases.len(),
            sales = result.sales.len(),
            warnings = result.warnings.len(),
            "Ledger rows mapped"
        );
        Ok(result)
    }

    /// Signed amounts per table and column for one row.
    fn row_amounts<'a>(
        row: &LedgerRow,
        known: &[&'a str],
        mapping: &'a TaxGridMapping,
        warnings: &mut Warnings,
    ) -> Result<RowAmounts<'a>, MappingError> {
        let mut amounts = RowAmounts::new();
        let mut written_by: BTreeMap<(Table, &str), &str> = BTreeMap::new();

        for &tag in known {
            let Some(rule) = mapping.rule(tag) else {
                continue;
            };

            let amount = match mapping.amount_source {
                AmountSource::RowBalance => row.balance,
                AmountSource::TagAmounts => row.tag_amounts.get(tag).copied(),
            };
            let Some(amount) = amount else {
                warnings.push(Warning::MissingTagAmount {
                    row: row.index,
                    tag: tag.to_string(),
                });
                continue;
            };

            for target in &rule.targets {
                let key = (target.table, target.amount_column.as_str());
                if let Some(&first_tag) = written_by.get(&key)
                    && first_tag != tag
                {
                    return Err(MappingError::Collision {
                        row: row.index,
                        first_tag: first_tag.to_string(),
                        second_tag: tag.to_string(),
                        document_number: row
                            .document_number(mapping.document_number_sources.for_table(target.table))
                            .to_string(),
                        table: target.table,
                        column: target.amount_column.clone(),
                    });
                }
                written_by.insert(key, tag);
                amounts
                    .entry(target.table)
                    .or_default()
                    .insert(target.amount_column.as_str(), target.sign.apply(amount));
            }
        }

        Ok(amounts)
    }

    /// Normalized document type of a row, warning when it is not
    /// recognized.
    fn document_type(row: &LedgerRow, warnings: &mut Warnings) -> String {
        match normalize_document_type(&row.document_type) {
            Some(code) => code.to_string(),
            None => {
                warnings.push(Warning::UnrecognizedDocumentType {
                    row: row.index,
                    value: row.document_type.clone(),
                });
                row.document_type.clone()
            }
        }
    }

    fn build_row(
        row: &LedgerRow,
        table: Table,
        document_type: &str,
        values: &BTreeMap<&str, Decimal>,
        mapping: &TaxGridMapping,
        schemas: &SchemaSet,
    ) -> Result<Record, MappingError> {
        let mut record = Record::with_defaults(schemas.table(table));

        let counterparty_vat = if row.counterparty_vat.is_empty() {
            mapping.unidentified_counterparty_vat.as_str()
        } else {
            row.counterparty_vat.as_str()
        };

        record.set_if_present("vat_number", row.company_vat.as_str());
        record.set_if_present("tax_period", row.tax_period.yyyymm());
        record.set_if_present("document_type", document_type);
        record.set_if_present(
            "document_number",
            row.document_number(mapping.document_number_sources.for_table(table)),
        );
        record.set_if_present(
            "document_date",
            row.document_date.format("%Y-%m-%d").to_string(),
        );
        record.set_if_present("counterparty_vat", counterparty_vat);
        record.set_if_present("counterparty_name", row.counterparty_name.as_str());

        for (&column, &amount) in values {
            if !record.set_if_present(column, amount) {
                return Err(MappingError::UnknownColumn {
                    table,
                    column: column.to_string(),
                });
            }
        }

        for rule in mapping.derived_totals_for(table) {
            let total = rule.total(&record);
            if !record.set_if_present(&rule.target_field, total) {
                return Err(MappingError::UnknownColumn {
                    table,
                    column: rule.target_field.clone(),
                });
            }
        }

        Ok(record)
    }
}

/// Leading two ASCII digits of a trimmed document type, if present.
#[must_use]
pub fn normalize_document_type(raw: &str) -> Option<&str> {
    let code = raw.trim().get(..2)?;
    code.bytes().all(|b| b.is_ascii_digit()).then_some(code)
}
