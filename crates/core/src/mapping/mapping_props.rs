//! Property-based tests for the mapping service.
//!
//! - Two distinct tags writing one column of a row always abort the run
//! - Column sums equal the signed sum of the contributing balances
//! - Derived totals equal the sum of their components on every row

use std::collections::BTreeMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use vattool_shared::TaxPeriod;

use super::error::MappingError;
use super::service::MappingService;
use super::types::{
    AmountSource, DerivedTotal, DocumentNumberSources, Sign, TagRule, Target, TaxGridMapping,
};
use crate::ledger::LedgerRow;
use crate::schema::{Align, FieldType, Newline, SchemaField, SchemaSet, Table, TableSchema};

const SALES_COLUMNS: [&str; 4] = ["base_20", "vat_20", "base_9", "vat_9"];

fn schema(name: &str, amounts: &[&str]) -> TableSchema {
    TableSchema {
        schema_name: name.to_string(),
        file_encoding: "cp1251".to_string(),
        line_length: 0,
        newline: Newline::Crlf,
        fields: amounts
            .iter()
            .map(|n| SchemaField {
                code: String::new(),
                internal_name: (*n).to_string(),
                field_type: FieldType::Numeric,
                required: false,
                is_amount: true,
                start_pos: None,
                length: None,
                align: Align::Right,
                pad_char: None,
                decimals: Some(2),
            })
            .collect(),
    }
}

fn schemas() -> SchemaSet {
    let mut sales_columns = SALES_COLUMNS.to_vec();
    sales_columns.push("total_tax_base");
    SchemaSet {
        purchases: schema("pokupki", &["vat_full_credit"]),
        sales: schema("prodagbi", &sales_columns),
        declaration: schema("deklar", &[]),
        trade: schema("vies", &[]),
    }
}

/// One tag per sales column: tag `t{i}` writes `SALES_COLUMNS[i]` with a
/// minus sign. Tag `x0` collides with `t0`.
fn mapping() -> TaxGridMapping {
    let mut tags: BTreeMap<String, TagRule> = SALES_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| {
            (
                format!("t{i}"),
                TagRule {
                    label: String::new(),
                    targets: vec![Target {
                        table: Table::Sales,
                        amount_column: (*column).to_string(),
                        sign: Sign::Minus,
                    }],
                },
            )
        })
        .collect();
    tags.insert(
        "x0".to_string(),
        TagRule {
            label: String::new(),
            targets: vec![Target {
                table: Table::Sales,
                amount_column: SALES_COLUMNS[0].to_string(),
                sign: Sign::Plus,
            }],
        },
    );

    TaxGridMapping {
        tags,
        amount_source: AmountSource::RowBalance,
        unidentified_counterparty_vat: "9999999999999".to_string(),
        document_number_sources: DocumentNumberSources::default(),
        derived_totals: vec![DerivedTotal {
            table: Table::Sales,
            target_field: "total_tax_base".to_string(),
            components: vec!["base_20".to_string(), "base_9".to_string()],
        }],
    }
}

fn ledger_row(index: usize, tags: Vec<String>, balance: Decimal) -> LedgerRow {
    LedgerRow {
        index,
        company_vat: "BG999".to_string(),
        counterparty_vat: "BG111".to_string(),
        counterparty_name: String::new(),
        tags,
        balance: Some(balance),
        tag_amounts: BTreeMap::new(),
        document_type: "01".to_string(),
        document_numbers: BTreeMap::new(),
        document_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        tax_period: TaxPeriod::new(2024, 3).unwrap(),
    }
}

/// Strategy for balances with two fraction digits.
fn balance() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a sorted, distinct, non-empty set of non-colliding tags.
fn tag_set() -> impl Strategy<Value = Vec<String>> {
    proptest::sample::subsequence(vec!["t0", "t1", "t2", "t3"], 1..=4)
        .prop_map(|tags| tags.into_iter().map(String::from).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Adding the colliding tag to any row that carries `t0` aborts.
    #[test]
    fn prop_collision_always_aborts(
        rows in prop::collection::vec((tag_set(), balance()), 1..10),
        victim in any::<prop::sample::Index>(),
    ) {
        let mut ledger: Vec<LedgerRow> = rows
            .into_iter()
            .enumerate()
            .map(|(i, (tags, amount))| ledger_row(i, tags, amount))
            .collect();
        let victim = victim.index(ledger.len());
        let tags = &mut ledger[victim].tags;
        if !tags.iter().any(|t| t == "t0") {
            tags.insert(0, "t0".to_string());
        }
        tags.push("x0".to_string());

        let result = MappingService::map(&ledger, &mapping(), &schemas());
        let is_collision = matches!(result, Err(MappingError::Collision { .. }));
        prop_assert!(is_collision);
    }

    /// Each column sums to minus the sum of balances of rows carrying its
    /// tag, and derived totals match their components.
    #[test]
    fn prop_sign_conservation(rows in prop::collection::vec((tag_set(), balance()), 0..20)) {
        let ledger: Vec<LedgerRow> = rows
            .into_iter()
            .enumerate()
            .map(|(i, (tags, amount))| ledger_row(i, tags, amount))
            .collect();

        let result = MappingService::map(&ledger, &mapping(), &schemas()).unwrap();
        prop_assert_eq!(result.sales.len(), ledger.len());

        for (i, column) in SALES_COLUMNS.iter().enumerate() {
            let tag = format!("t{i}");
            let expected: Decimal = -ledger
                .iter()
                .filter(|row| row.tags.contains(&tag))
                .filter_map(|row| row.balance)
                .sum::<Decimal>();
            let actual: Decimal = result.sales.iter().map(|r| r.decimal(column)).sum();
            prop_assert_eq!(actual, expected);
        }

        for record in &result.sales {
            prop_assert_eq!(
                record.decimal("total_tax_base"),
                record.decimal("base_20") + record.decimal("base_9")
            );
        }
    }
}
