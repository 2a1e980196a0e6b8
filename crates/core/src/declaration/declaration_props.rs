//! Property-based tests for declaration aggregation.
//!
//! - An empty sum is zero and `X - X` is zero for any tables
//! - A sum equals the column total over its table
//! - Distinct counts never exceed the row count and ignore duplicates

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::expression::{Expression, SourceRef};
use super::service::count_distinct;
use super::types::DocumentCountRule;
use crate::schema::{FieldValue, Record, Table};

fn amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn rows() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec((amount(), 0u8..5), 0..20).prop_map(|values| {
        values
            .into_iter()
            .map(|(vat, number)| {
                [
                    ("total_vat", FieldValue::from(vat)),
                    ("document_number", FieldValue::from(number.to_string())),
                ]
                .into_iter()
                .collect()
            })
            .collect()
    })
}

fn total_vat() -> Expression {
    Expression::Sum {
        sources: vec![SourceRef {
            table: Table::Sales,
            field: "total_vat".to_string(),
        }],
    }
}

fn count_rule() -> DocumentCountRule {
    DocumentCountRule {
        source_table: Table::Sales,
        distinct_key_fields: vec!["document_number".to_string()],
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_identities(purchases in rows(), sales in rows()) {
        let empty = Expression::Sum { sources: vec![] };
        prop_assert_eq!(empty.evaluate(&purchases, &sales), Decimal::ZERO);

        let self_difference = Expression::Subtract {
            left: Box::new(total_vat()),
            right: Box::new(total_vat()),
        };
        prop_assert_eq!(self_difference.evaluate(&purchases, &sales), Decimal::ZERO);
    }

    #[test]
    fn prop_sum_is_column_total(purchases in rows(), sales in rows()) {
        let expected: Decimal = sales.iter().map(|r| r.decimal("total_vat")).sum();
        prop_assert_eq!(total_vat().evaluate(&purchases, &sales), expected);
    }

    #[test]
    fn prop_distinct_count(sales in rows()) {
        let count = count_distinct(&sales, &count_rule());
        prop_assert!(count <= sales.len());
        prop_assert!(count <= 5);

        let mut doubled = sales.clone();
        doubled.extend(sales.iter().cloned());
        prop_assert_eq!(count_distinct(&doubled, &count_rule()), count);
    }
}
