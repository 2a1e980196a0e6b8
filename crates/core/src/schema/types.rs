//! Output schema descriptors.
//!
//! Every output file (both ledger tables, the declaration and the trade
//! declaration) is described by a `TableSchema`: an ordered list of fields,
//! each with a value type and, for the fixed-width form, a position.

use serde::{Deserialize, Deserializer};

/// The two transactional output tables a tag may write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum Table {
    /// Purchase ledger (`pokupki`).
    #[serde(rename = "pokupki")]
    Purchases,
    /// Sales ledger (`prodagbi`).
    #[serde(rename = "prodagbi")]
    Sales,
}

impl Table {
    /// Both tables, in output order.
    pub const ALL: [Self; 2] = [Self::Purchases, Self::Sales];

    /// Name used in configuration files and output file names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Purchases => "pokupki",
            Self::Sales => "prodagbi",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Value type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FieldType {
    /// Exact decimal value.
    #[serde(
        rename = "numeric",
        alias = "float64",
        alias = "int64",
        alias = "decimal",
        alias = "number"
    )]
    Numeric,
    /// Free text.
    #[serde(rename = "text", alias = "object", alias = "string")]
    Text,
}

/// Side a fixed-width value is aligned to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Value first, padding after.
    #[default]
    Left,
    /// Padding first, value after.
    Right,
}

/// Line terminator of a fixed-width file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Newline {
    /// `\r\n`
    #[default]
    #[serde(rename = "CRLF", alias = "crlf")]
    Crlf,
    /// `\n`
    #[serde(rename = "LF", alias = "lf")]
    Lf,
    /// `\r`
    #[serde(rename = "CR", alias = "cr")]
    Cr,
}

impl Newline {
    /// The terminator characters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crlf => "\r\n",
            Self::Lf => "\n",
            Self::Cr => "\r",
        }
    }
}

/// One column of an output record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchemaField {
    /// Authority field code, e.g. `03-41` or `VIR-03`.
    #[serde(default)]
    pub code: String,
    /// Name the engine reads and writes the value under.
    pub internal_name: String,
    /// Value type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the authority requires the field.
    #[serde(default, deserialize_with = "bool_or_null")]
    pub required: bool,
    /// Whether the field holds a monetary amount.
    #[serde(default, deserialize_with = "bool_or_null")]
    pub is_amount: bool,
    /// 1-based start column in the fixed-width line.
    #[serde(default)]
    pub start_pos: Option<usize>,
    /// Width in characters.
    #[serde(default)]
    pub length: Option<usize>,
    /// Alignment inside the slot.
    #[serde(default)]
    pub align: Align,
    /// Padding character, a space when absent.
    #[serde(default)]
    pub pad_char: Option<char>,
    /// Fraction digits for numeric values.
    #[serde(default)]
    pub decimals: Option<u32>,
}

/// `null` reads as `false`.
fn bool_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Option::<bool>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl SchemaField {
    /// Padding character, defaulting to a space.
    #[must_use]
    pub fn pad(&self) -> char {
        self.pad_char.unwrap_or(' ')
    }

    /// `(start_pos, length)` when the field has a fixed-width slot.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        self.start_pos.zip(self.length)
    }

    /// Section prefix of the field code (`VIR-03` → `VIR`).
    #[must_use]
    pub fn section(&self) -> Option<&str> {
        self.code.split_once('-').map(|(section, _)| section)
    }

    /// Whether the field holds a decimal value.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.field_type == FieldType::Numeric
    }
}

/// Schema of one output file.
#[derive(Debug, Clone, Deserialize)]
pub struct TableSchema {
    /// Schema identifier, used in messages.
    #[serde(default)]
    pub schema_name: String,
    /// WHATWG encoding label for the fixed-width file.
    #[serde(default = "default_encoding")]
    pub file_encoding: String,
    /// Exact character count of every fixed-width line.
    pub line_length: usize,
    /// Line terminator of the fixed-width file.
    #[serde(default)]
    pub newline: Newline,
    /// Fields in declaration order.
    pub fields: Vec<SchemaField>,
}

fn default_encoding() -> String {
    "cp1251".to_string()
}

impl TableSchema {
    /// Field names in declaration order, the delimited column order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.internal_name.as_str()).collect()
    }

    /// Looks up a field by internal name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.internal_name == name)
    }
}

/// The four output schemas of one filing.
#[derive(Debug, Clone)]
pub struct SchemaSet {
    /// Purchase ledger schema.
    pub purchases: TableSchema,
    /// Sales ledger schema.
    pub sales: TableSchema,
    /// Declaration record schema.
    pub declaration: TableSchema,
    /// Trade declaration schema (all sections).
    pub trade: TableSchema,
}

impl SchemaSet {
    /// Schema of a transactional table.
    #[must_use]
    pub const fn table(&self, table: Table) -> &TableSchema {
        match table {
            Table::Purchases => &self.purchases,
            Table::Sales => &self.sales,
        }
    }
}
