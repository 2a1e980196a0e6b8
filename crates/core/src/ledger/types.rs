//! Ledger domain types.
//!
//! A ledger export is mapped onto semantic keys by `LedgerColumns`, then
//! normalized into `LedgerRow`s: trimmed, typed, and with a canonical tag
//! order.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use vattool_shared::TaxPeriod;
use vattool_shared::config::DateModeSetting;

use super::error::LedgerError;

/// Semantic keys of the document-number column family.
pub const DOCUMENT_NUMBER_KEYS: [&str; 5] = [
    "document_number",
    "purchase_doc_number",
    "purchase_ref",
    "sales_doc_number",
    "sales_move_name",
];

/// Mapping of semantic ledger keys to raw CSV header names.
///
/// Every key is optional at decode time so that missing required keys are
/// reported together by [`LedgerColumns::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LedgerColumns {
    /// Company VAT id column. Required.
    pub company_vat: Option<String>,
    /// Company display name column.
    pub company_name: Option<String>,
    /// Counterparty VAT id column. Required.
    pub counterparty_vat: Option<String>,
    /// Counterparty name column.
    pub partner_name: Option<String>,
    /// Comma-separated tax tag column. Required.
    pub tax_tag_ids: Option<String>,
    /// Signed balance column. Required.
    pub balance: Option<String>,
    /// `tag=amount;...` column for per-tag amounts.
    pub tag_amounts: Option<String>,
    /// Raw document type column. Required.
    pub document_type: Option<String>,
    /// Document date column. Required.
    pub document_date: Option<String>,
    /// Tax period date column; takes precedence over
    /// `tax_period_source_date`.
    pub tax_period: Option<String>,
    /// Fallback date column the tax period is derived from.
    pub tax_period_source_date: Option<String>,
    /// Generic document number column.
    pub document_number: Option<String>,
    /// Vendor bill number column.
    pub purchase_doc_number: Option<String>,
    /// Vendor reference column.
    pub purchase_ref: Option<String>,
    /// Customer invoice number column.
    pub sales_doc_number: Option<String>,
    /// Journal move name column.
    pub sales_move_name: Option<String>,
}

impl LedgerColumns {
    /// Checks that every required key is mapped.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingMapping` listing every unmapped key.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let required = [
            ("company_vat", &self.company_vat),
            ("counterparty_vat", &self.counterparty_vat),
            ("tax_tag_ids", &self.tax_tag_ids),
            ("balance", &self.balance),
            ("document_type", &self.document_type),
            ("document_date", &self.document_date),
        ];

        let mut missing: Vec<String> = required
            .iter()
            .filter(|(_, column)| is_blank(column.as_deref()))
            .map(|(key, _)| (*key).to_string())
            .collect();
        if self.tax_period_column().is_none() {
            missing.push("tax_period or tax_period_source_date".to_string());
        }
        if self
            .document_number_columns()
            .iter()
            .all(|(_, column)| column.trim().is_empty())
        {
            missing.push(format!("one of {}", DOCUMENT_NUMBER_KEYS.join(", ")));
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::MissingMapping(missing))
        }
    }

    /// Column the tax period is read from.
    #[must_use]
    pub fn tax_period_column(&self) -> Option<&str> {
        [&self.tax_period, &self.tax_period_source_date]
            .into_iter()
            .find_map(|column| column.as_deref().filter(|c| !c.trim().is_empty()))
    }

    /// Mapped document-number columns as `(semantic key, column)` pairs.
    #[must_use]
    pub fn document_number_columns(&self) -> Vec<(&'static str, &str)> {
        let columns = [
            &self.document_number,
            &self.purchase_doc_number,
            &self.purchase_ref,
            &self.sales_doc_number,
            &self.sales_move_name,
        ];
        DOCUMENT_NUMBER_KEYS
            .into_iter()
            .zip(columns)
            .filter_map(|(key, column)| column.as_deref().map(|c| (key, c)))
            .collect()
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// How ledger date cells are parsed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateMode {
    /// Try `%d/%m/%Y`, `%Y-%m-%d` and `%d.%m.%Y` in order.
    #[default]
    Auto,
    /// Use one `strftime`-style format.
    Explicit(String),
}

impl DateMode {
    /// Formats tried in auto mode.
    pub const AUTO_FORMATS: [&'static str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%d.%m.%Y"];

    /// Builds the mode from application settings.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingDateFormat` for explicit mode without a
    /// non-blank format.
    pub fn from_settings(
        setting: DateModeSetting,
        format: Option<&str>,
    ) -> Result<Self, LedgerError> {
        match setting {
            DateModeSetting::Auto => Ok(Self::Auto),
            DateModeSetting::Explicit => format
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(|f| Self::Explicit(f.to_string()))
                .ok_or(LedgerError::MissingDateFormat),
        }
    }

    /// Parses one trimmed cell. Blank cells never parse.
    #[must_use]
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        if raw.is_empty() {
            return None;
        }
        match self {
            Self::Auto => Self::AUTO_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok()),
            Self::Explicit(format) => NaiveDate::parse_from_str(raw, format).ok(),
        }
    }
}

/// One ledger row after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    /// 0-based data row index in the source file.
    pub index: usize,
    /// Company VAT id as written on the row (may be blank).
    pub company_vat: String,
    /// Counterparty VAT id, trimmed.
    pub counterparty_vat: String,
    /// Counterparty name, trimmed.
    pub counterparty_name: String,
    /// Tax tags: trimmed, deduplicated, sorted.
    pub tags: Vec<String>,
    /// Signed balance, if the cell was not blank.
    pub balance: Option<Decimal>,
    /// Per-tag amounts.
    pub tag_amounts: BTreeMap<String, Decimal>,
    /// Raw document type, trimmed.
    pub document_type: String,
    /// Document numbers keyed by semantic key (see
    /// [`DOCUMENT_NUMBER_KEYS`]), trimmed.
    pub document_numbers: BTreeMap<String, String>,
    /// Document date.
    pub document_date: NaiveDate,
    /// Tax period the row is declared in.
    pub tax_period: TaxPeriod,
}

impl LedgerRow {
    /// First non-blank document number among the given semantic keys.
    #[must_use]
    pub fn document_number<'a>(&'a self, sources: &[String]) -> &'a str {
        sources
            .iter()
            .filter_map(|key| self.document_numbers.get(key))
            .map(String::as_str)
            .find(|value| !value.is_empty())
            .unwrap_or("")
    }
}

/// A normalized ledger export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerBatch {
    /// Rows in source order.
    pub rows: Vec<LedgerRow>,
    /// First non-blank company VAT id.
    pub company_vat: String,
    /// First non-blank company name, possibly empty.
    pub company_name: String,
    /// Distinct tax periods present, sorted.
    pub tax_periods: Vec<TaxPeriod>,
}
