//! Property-based tests for the fixed-width codec.
//!
//! - Every rendered line has exactly `line_length` characters
//! - Rendering then parsing yields the original values when they fit

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::fixed_width::FixedWidthCodec;
use crate::schema::{Align, FieldType, FieldValue, Newline, Record, SchemaField, TableSchema};
use crate::warning::Warnings;

const LINE_LENGTH: usize = 60;

/// Strategy for amounts with two fraction digits (-999,999.99 to 999,999.99).
fn amount() -> impl Strategy<Value = Decimal> {
    (-99_999_999i64..=99_999_999i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for text without leading or trailing blanks.
fn word() -> impl Strategy<Value = String> {
    "[A-Za-z0-9АБВГДабвгд]{0,12}"
}

/// Strategy for arbitrary text, including over-long values.
fn any_text() -> impl Strategy<Value = String> {
    "[ -~Фф]{0,40}"
}

fn schema() -> TableSchema {
    let text = |name: &str, start_pos: usize| SchemaField {
        code: String::new(),
        internal_name: name.to_string(),
        field_type: FieldType::Text,
        required: false,
        is_amount: false,
        start_pos: Some(start_pos),
        length: Some(12),
        align: Align::Left,
        pad_char: None,
        decimals: None,
    };
    let numeric = |name: &str, start_pos: usize| SchemaField {
        code: String::new(),
        internal_name: name.to_string(),
        field_type: FieldType::Numeric,
        required: false,
        is_amount: true,
        start_pos: Some(start_pos),
        length: Some(15),
        align: Align::Right,
        pad_char: None,
        decimals: Some(2),
    };

    TableSchema {
        schema_name: "props".to_string(),
        file_encoding: "cp1251".to_string(),
        line_length: LINE_LENGTH,
        newline: Newline::Crlf,
        fields: vec![
            text("name", 1),
            text("reference", 13),
            numeric("base", 25),
            numeric("vat", 40),
        ],
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any record, including over-long text, renders to exactly one
    /// line of the schema length.
    #[test]
    fn prop_line_length_invariant(
        name in any_text(),
        reference in any_text(),
        base in amount(),
        vat in amount(),
    ) {
        let schema = schema();
        let record: Record = [
            ("name", FieldValue::from(name)),
            ("reference", FieldValue::from(reference)),
            ("base", FieldValue::from(base)),
            ("vat", FieldValue::from(vat)),
        ]
        .into_iter()
        .collect();

        let line = FixedWidthCodec::render_line(&record, &schema, &mut Warnings::new()).unwrap();
        prop_assert_eq!(line.chars().count(), LINE_LENGTH);
    }

    /// Values that fit their slots survive a render/parse cycle.
    #[test]
    fn prop_round_trip(
        name in word(),
        reference in word(),
        base in amount(),
        vat in amount(),
    ) {
        let schema = schema();
        let record: Record = [
            ("name", FieldValue::from(name.clone())),
            ("reference", FieldValue::from(reference.clone())),
            ("base", FieldValue::from(base)),
            ("vat", FieldValue::from(vat)),
        ]
        .into_iter()
        .collect();

        let mut warnings = Warnings::new();
        let line = FixedWidthCodec::render_line(&record, &schema, &mut warnings).unwrap();
        let parsed = FixedWidthCodec::parse_line(&line, &schema).unwrap();

        prop_assert!(warnings.is_empty());
        prop_assert_eq!(parsed.text("name"), name);
        prop_assert_eq!(parsed.text("reference"), reference);
        prop_assert_eq!(parsed.decimal("base"), base);
        prop_assert_eq!(parsed.decimal("vat"), vat);
    }

    /// A record holding only schema defaults still renders a full line.
    #[test]
    fn prop_default_record_has_full_length(line_length in 60usize..200) {
        let mut schema = schema();
        schema.line_length = line_length;
        let record = Record::with_defaults(&schema);

        let line = FixedWidthCodec::render_line(&record, &schema, &mut Warnings::new()).unwrap();
        prop_assert_eq!(line.chars().count(), line_length);
    }
}
