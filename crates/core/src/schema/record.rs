//! Schema-shaped output rows.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::types::{FieldType, TableSchema};

/// A single field value: an exact decimal or text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Decimal value.
    Number(Decimal),
    /// Text value.
    Text(String),
}

impl FieldValue {
    /// Type-correct default: `0` for numeric fields, empty text otherwise.
    #[must_use]
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Numeric => Self::Number(Decimal::ZERO),
            FieldType::Text => Self::Text(String::new()),
        }
    }

    /// Decimal view of the value.
    ///
    /// Blank text reads as zero; text that is not a number has no decimal
    /// view.
    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) if text.trim().is_empty() => Some(Decimal::ZERO),
            Self::Text(text) => Decimal::from_str(text.trim()).ok(),
        }
    }

    /// Whether the value is empty text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

/// Numbers print in plain fixed-point notation.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One output row: field name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record holding every schema field at its default.
    #[must_use]
    pub fn with_defaults(schema: &TableSchema) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|field| {
                (
                    field.internal_name.clone(),
                    FieldValue::default_for(field.field_type),
                )
            })
            .collect();
        Self { values }
    }

    /// Value of a field, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Whether the record has the field.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Sets a field, adding it when absent.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Sets a field only when the record already has it.
    ///
    /// Returns whether the value was written.
    pub fn set_if_present(&mut self, name: &str, value: impl Into<FieldValue>) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Decimal value of a field; missing or non-numeric fields read as zero.
    #[must_use]
    pub fn decimal(&self, name: &str) -> Decimal {
        self.get(name)
            .and_then(FieldValue::as_decimal)
            .unwrap_or(Decimal::ZERO)
    }

    /// Text form of a field; missing fields read as empty.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(ToString::to_string).unwrap_or_default()
    }

    /// Iterates fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}
