//! Declaration aggregation service.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use super::types::{DeclarationContext, DeclarationResult, DeclarationRules, DocumentCountRule};
use crate::schema::{Record, Table, TableSchema};
use crate::warning::{Warning, Warnings};

/// Declaration aggregation service.
pub struct DeclarationService;

impl DeclarationService {
    /// Builds the single declaration record from the two ledger tables.
    ///
    /// Steps:
    /// 1. Start from the schema defaults
    /// 2. Copy identity fields from the first row that carries them
    /// 3. Apply the run context
    /// 4. Apply field rules in order
    /// 5. Apply distinct document counts
    /// 6. Recompute VAT due and refundable from the delta
    #[must_use]
    pub fn build(
        purchases: &[Record],
        sales: &[Record],
        rules: &DeclarationRules,
        schema: &TableSchema,
        context: &DeclarationContext,
    ) -> DeclarationResult {
        let mut record = Record::with_defaults(schema);
        let mut warnings = Warnings::new();

        // 2. Identity
        for field in ["vat_number", "tax_period"] {
            if let Some(value) = first_available(field, purchases, sales) {
                record.set_if_present(field, value);
            }
        }
        record.set_if_present("branch_number", "0");

        // 3. Context
        let taxpayer_name = context.taxpayer_name.trim();
        if !taxpayer_name.is_empty() {
            record.set_if_present("taxpayer_name", taxpayer_name);
        }
        let submitter_person = context.submitter_person.trim();
        if !submitter_person.is_empty() {
            record.set_if_present("submitter_person", submitter_person);
        }

        // 4. Field rules
        for rule in &rules.field_rules {
            let value = rule.expression.evaluate(purchases, sales);
            record.set(rule.target_field.clone(), value);
        }

        // 5. Document counts
        for (target_field, rule) in &rules.document_count_rules {
            let rows = match rule.source_table {
                Table::Purchases => purchases,
                Table::Sales => sales,
            };
            record.set(target_field.clone(), Decimal::from(count_distinct(rows, rule)));
        }

        // 6. Due / refundable
        if record.contains("vat_due") && record.contains("vat_refundable") {
            Self::recompute_due_refundable(&mut record, &mut warnings);
        }

        tracing::debug!(
            purchases = purchases.len(),
            sales = sales.len(),
            warnings = warnings.len(),
            "Declaration built"
        );

        DeclarationResult { record, warnings }
    }

    fn recompute_due_refundable(record: &mut Record, warnings: &mut Warnings) {
        let delta = record.decimal("sales_total_vat") - record.decimal("total_tax_credit");
        let due = if delta > Decimal::ZERO {
            delta
        } else {
            Decimal::ZERO
        };
        let refundable = if delta < Decimal::ZERO {
            -delta
        } else {
            Decimal::ZERO
        };

        let changed =
            record.decimal("vat_due") != due || record.decimal("vat_refundable") != refundable;
        if !delta.is_zero() && changed {
            warnings.push(Warning::DueRefundableRecalculated {
                delta,
                due,
                refundable,
            });
        }

        record.set("vat_due", due);
        record.set("vat_refundable", refundable);
    }
}

/// First non-blank text value of `field`, searching purchases then sales.
fn first_available(field: &str, purchases: &[Record], sales: &[Record]) -> Option<String> {
    purchases
        .iter()
        .chain(sales)
        .filter_map(|row| row.get(field))
        .find(|value| !value.is_blank())
        .map(ToString::to_string)
}

/// Number of distinct key tuples, comparing the text form of each value.
/// A missing field contributes an empty string.
#[must_use]
pub fn count_distinct(rows: &[Record], rule: &DocumentCountRule) -> usize {
    rows.iter()
        .map(|row| {
            rule.distinct_key_fields
                .iter()
                .map(|field| row.text(field))
                .collect::<Vec<_>>()
        })
        .collect::<BTreeSet<_>>()
        .len()
}
