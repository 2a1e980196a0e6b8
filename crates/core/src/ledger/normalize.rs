//! Ledger normalization.
//!
//! Turns a raw ledger CSV export into typed `LedgerRow`s. The source is
//! read as text only; every conversion happens here so that errors can name
//! the row and column they come from.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use vattool_shared::TaxPeriod;

use super::error::LedgerError;
use super::types::{DateMode, LedgerBatch, LedgerColumns, LedgerRow};

/// Maximum number of distinct offending values reported for a date column.
const MAX_DATE_EXAMPLES: usize = 3;

/// Ledger normalizer.
pub struct LedgerNormalizer;

impl LedgerNormalizer {
    /// Reads and normalizes a ledger CSV export.
    ///
    /// Steps:
    /// 1. Validate the column mapping
    /// 2. Resolve the mapped columns against the CSV header
    /// 3. Determine the company VAT id (first non-blank value)
    /// 4. Parse tags, balances, per-tag amounts and both date columns
    /// 5. Collect the distinct tax periods
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` for a missing mapping or column, a blank
    /// company VAT column, or an unparsable balance, tag amount or date.
    pub fn normalize<R: Read>(
        reader: R,
        columns: &LedgerColumns,
        date_mode: &DateMode,
    ) -> Result<LedgerBatch, LedgerError> {
        // 1. Validate mapping
        columns.validate()?;

        let mut csv = ReaderBuilder::new().flexible(true).from_reader(reader);
        let header = Header::new(csv.headers()?);
        let records = csv.records().collect::<Result<Vec<_>, _>>()?;

        // 2. Resolve columns
        let company_vat_col = required(columns.company_vat.as_deref(), "company_vat")?;
        let tags_col = required(columns.tax_tag_ids.as_deref(), "tax_tag_ids")?;
        let document_date_col = required(columns.document_date.as_deref(), "document_date")?;
        let tax_period_col = columns
            .tax_period_column()
            .ok_or_else(|| LedgerError::MissingMapping(vec!["tax_period".to_string()]))?;

        let company_vat_idx = header.require("company VAT", company_vat_col)?;
        let tags_idx = header.require("tax tags", tags_col)?;
        let document_date_idx = header.require("document date", document_date_col)?;
        let tax_period_idx = header.require("tax period source date", tax_period_col)?;

        let balance_idx = header.optional(columns.balance.as_deref());
        let tag_amounts_idx = header.optional(columns.tag_amounts.as_deref());
        let company_name_idx = header.optional(columns.company_name.as_deref());
        let counterparty_vat_idx = header.optional(columns.counterparty_vat.as_deref());
        let partner_name_idx = header.optional(columns.partner_name.as_deref());
        let document_type_idx = header.optional(columns.document_type.as_deref());
        let document_number_idx: Vec<(&str, usize)> = columns
            .document_number_columns()
            .into_iter()
            .filter_map(|(key, column)| header.optional(Some(column)).map(|idx| (key, idx)))
            .collect();

        // 3. Company identity
        let company_vat = first_non_blank(&records, Some(company_vat_idx));
        if company_vat.is_empty() {
            return Err(LedgerError::BlankCompanyVat(company_vat_col.to_string()));
        }
        let company_name = first_non_blank(&records, company_name_idx);

        // 4. Dates first, so a bad date column is reported as a whole
        let document_dates = parse_date_column(&records, document_date_idx, document_date_col, date_mode)?;
        let tax_period_dates = parse_date_column(&records, tax_period_idx, tax_period_col, date_mode)?;

        let mut rows = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let balance = match balance_idx {
                Some(idx) => parse_amount(cell(record, Some(idx))).map_err(|_| {
                    LedgerError::InvalidBalance {
                        row: index,
                        value: cell(record, Some(idx)).to_string(),
                    }
                })?,
                None => None,
            };

            let tag_amounts = parse_tag_amounts(cell(record, tag_amounts_idx), index)?;

            let document_numbers = document_number_idx
                .iter()
                .map(|(key, idx)| ((*key).to_string(), cell(record, Some(*idx)).trim().to_string()))
                .collect();

            rows.push(LedgerRow {
                index,
                company_vat: cell(record, Some(company_vat_idx)).trim().to_string(),
                counterparty_vat: cell(record, counterparty_vat_idx).trim().to_string(),
                counterparty_name: cell(record, partner_name_idx).trim().to_string(),
                tags: parse_tags(cell(record, Some(tags_idx))),
                balance,
                tag_amounts,
                document_type: cell(record, document_type_idx).trim().to_string(),
                document_numbers,
                document_date: document_dates[index],
                tax_period: TaxPeriod::from_date(tax_period_dates[index]),
            });
        }

        // 5. Tax periods
        let tax_periods: Vec<TaxPeriod> = rows
            .iter()
            .map(|row| row.tax_period)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        tracing::debug!(
            rows = rows.len(),
            company_vat = %company_vat,
            periods = tax_periods.len(),
            "Ledger normalized"
        );

        Ok(LedgerBatch {
            rows,
            company_vat,
            company_name,
            tax_periods,
        })
    }
}

/// Header name to column index.
struct Header {
    index: HashMap<String, usize>,
}

impl Header {
    /// Duplicate header names resolve to their first column.
    fn new(record: &StringRecord) -> Self {
        let mut index = HashMap::new();
        for (idx, name) in record.iter().enumerate() {
            index
                .entry(name.trim_start_matches('\u{feff}').to_string())
                .or_insert(idx);
        }
        Self { index }
    }

    fn require(&self, role: &str, column: &str) -> Result<usize, LedgerError> {
        self.index
            .get(column)
            .copied()
            .ok_or_else(|| LedgerError::MissingColumn {
                role: role.to_string(),
                column: column.to_string(),
            })
    }

    fn optional(&self, column: Option<&str>) -> Option<usize> {
        column.and_then(|c| self.index.get(c).copied())
    }
}

fn required<'a>(column: Option<&'a str>, key: &str) -> Result<&'a str, LedgerError> {
    column.ok_or_else(|| LedgerError::MissingMapping(vec![key.to_string()]))
}

fn cell(record: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| record.get(i)).unwrap_or("")
}

fn first_non_blank(records: &[StringRecord], idx: Option<usize>) -> String {
    records
        .iter()
        .map(|record| cell(record, idx).trim())
        .find(|value| !value.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Splits a tag cell on `,`, trims, drops empties, deduplicates and sorts.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Parses an amount cell.
///
/// Spaces are removed and a lone `,` without `.` is the decimal separator.
/// A blank cell has no amount.
///
/// # Errors
///
/// Returns the decimal parse error when the text is not a number.
pub fn parse_amount(raw: &str) -> Result<Option<Decimal>, rust_decimal::Error> {
    let mut text: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if text.is_empty() {
        return Ok(None);
    }
    if text.contains(',') && !text.contains('.') {
        text = text.replace(',', ".");
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(Some)
}

/// Parses `tag=amount` pairs separated by `;`. Blank amounts are skipped.
fn parse_tag_amounts(raw: &str, row: usize) -> Result<BTreeMap<String, Decimal>, LedgerError> {
    let mut amounts = BTreeMap::new();
    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let invalid = || LedgerError::InvalidTagAmount {
            row,
            value: entry.to_string(),
        };
        let (tag, amount) = entry.split_once('=').ok_or_else(invalid)?;
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(invalid());
        }
        if let Some(amount) = parse_amount(amount).map_err(|_| invalid())? {
            amounts.insert(tag.to_string(), amount);
        }
    }
    Ok(amounts)
}

fn parse_date_column(
    records: &[StringRecord],
    idx: usize,
    column: &str,
    date_mode: &DateMode,
) -> Result<Vec<chrono::NaiveDate>, LedgerError> {
    let mut parsed = Vec::with_capacity(records.len());
    let mut bad: Vec<String> = Vec::new();

    for record in records {
        let raw = cell(record, Some(idx)).trim();
        match date_mode.parse(raw) {
            Some(date) => parsed.push(date),
            None => {
                if !bad.iter().any(|b| b == raw) {
                    bad.push(raw.to_string());
                }
                if bad.len() >= MAX_DATE_EXAMPLES {
                    break;
                }
            }
        }
    }

    if bad.is_empty() {
        Ok(parsed)
    } else {
        Err(LedgerError::InvalidDate {
            column: column.to_string(),
            examples: bad,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    const HEADER: &str = "company_id,company_id/vat,partner_id,partner_id/vat,tax_tag_ids,balance,date,invoice_date,move_id/l10n_bg_document_type,ref,move_name";

    fn columns() -> LedgerColumns {
        LedgerColumns {
            company_vat: Some("company_id/vat".to_string()),
            company_name: Some("company_id".to_string()),
            counterparty_vat: Some("partner_id/vat".to_string()),
            partner_name: Some("partner_id".to_string()),
            tax_tag_ids: Some("tax_tag_ids".to_string()),
            balance: Some("balance".to_string()),
            document_type: Some("move_id/l10n_bg_document_type".to_string()),
            document_date: Some("invoice_date".to_string()),
            tax_period_source_date: Some("date".to_string()),
            purchase_doc_number: Some("ref".to_string()),
            sales_move_name: Some("move_name".to_string()),
            sales_doc_number: Some("move_name".to_string()),
            ..LedgerColumns::default()
        }
    }

    fn csv(lines: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for line in lines {
            text.push('\n');
            text.push_str(line);
        }
        text
    }

    #[test]
    fn test_normalize_reads_rows() {
        let input = csv(&[
            "Firm,,Client,BG111,\"21, 11 ,21\",\"-1 234,50\",2024-03-31,15/03/2024,01 - Invoice,,INV/001",
            "Firm,BG999,Vendor,BG222,41,24.00,2024-03-31,16.03.2024,01,BILL-7,",
        ]);
        let batch = LedgerNormalizer::normalize(input.as_bytes(), &columns(), &DateMode::Auto).unwrap();

        assert_eq!(batch.company_vat, "BG999");
        assert_eq!(batch.company_name, "Firm");
        assert_eq!(batch.tax_periods, vec![TaxPeriod::new(2024, 3).unwrap()]);
        assert_eq!(batch.rows.len(), 2);

        let first = &batch.rows[0];
        assert_eq!(first.index, 0);
        assert_eq!(first.tags, ["11", "21"]);
        assert_eq!(first.balance, Some(dec!(-1234.50)));
        assert_eq!(first.document_type, "01 - Invoice");
        assert_eq!(first.document_date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(first.document_numbers["sales_move_name"], "INV/001");
        assert_eq!(first.document_numbers["purchase_doc_number"], "");

        let second = &batch.rows[1];
        assert_eq!(second.counterparty_vat, "BG222");
        assert_eq!(second.counterparty_name, "Vendor");
        assert_eq!(second.balance, Some(dec!(24.00)));
        assert_eq!(second.document_numbers["purchase_doc_number"], "BILL-7");
    }

    #[test]
    fn test_tax_periods_are_sorted_and_distinct() {
        let input = csv(&[
            "Firm,BG999,,,21,1,2024-04-02,01/04/2024,01,,A",
            "Firm,BG999,,,21,1,2024-03-31,01/03/2024,01,,B",
            "Firm,BG999,,,21,1,2024-04-15,01/04/2024,01,,C",
        ]);
        let batch = LedgerNormalizer::normalize(input.as_bytes(), &columns(), &DateMode::Auto).unwrap();
        assert_eq!(
            batch.tax_periods,
            vec![TaxPeriod::new(2024, 3).unwrap(), TaxPeriod::new(2024, 4).unwrap()]
        );
    }

    #[test]
    fn test_blank_balance_is_none() {
        let input = csv(&["Firm,BG999,,,21,,2024-03-31,01/03/2024,01,,A"]);
        let batch = LedgerNormalizer::normalize(input.as_bytes(), &columns(), &DateMode::Auto).unwrap();
        assert_eq!(batch.rows[0].balance, None);
    }

    #[test]
    fn test_invalid_balance_is_fatal() {
        let input = csv(&["Firm,BG999,,,21,abc,2024-03-31,01/03/2024,01,,A"]);
        let result = LedgerNormalizer::normalize(input.as_bytes(), &columns(), &DateMode::Auto);
        assert!(matches!(result, Err(LedgerError::InvalidBalance { row: 0, .. })));
    }

    #[test]
    fn test_duplicate_header_uses_first_column() {
        let input = "company_id/vat,tax_tag_ids,balance,date,invoice_date,balance\n\
                     BG999,21,12.50,2024-03-31,01/03/2024,99.00\n";
        let batch =
            LedgerNormalizer::normalize(input.as_bytes(), &columns(), &DateMode::Auto).unwrap();
        assert_eq!(batch.rows[0].balance, Some(dec!(12.50)));
    }

    #[test]
    fn test_missing_company_vat_column_is_fatal() {
        let mut cols = columns();
        cols.company_vat = Some("vat".to_string());
        let input = csv(&["Firm,BG999,,,21,1,2024-03-31,01/03/2024,01,,A"]);
        let result = LedgerNormalizer::normalize(input.as_bytes(), &cols, &DateMode::Auto);
        assert!(matches!(result, Err(LedgerError::MissingColumn { .. })));
    }

    #[test]
    fn test_blank_company_vat_is_fatal() {
        let input = csv(&["Firm, ,,,21,1,2024-03-31,01/03/2024,01,,A"]);
        let result = LedgerNormalizer::normalize(input.as_bytes(), &columns(), &DateMode::Auto);
        assert!(matches!(result, Err(LedgerError::BlankCompanyVat(_))));
    }

    #[test]
    fn test_bad_dates_list_up_to_three_distinct_values() {
        let input = csv(&[
            "Firm,BG999,,,21,1,2024-03-31,bad,01,,A",
            "Firm,BG999,,,21,1,2024-03-31,bad,01,,B",
            "Firm,BG999,,,21,1,2024-03-31,,01,,C",
            "Firm,BG999,,,21,1,2024-03-31,31/02/2024,01,,D",
            "Firm,BG999,,,21,1,2024-03-31,later,01,,E",
        ]);
        let result = LedgerNormalizer::normalize(input.as_bytes(), &columns(), &DateMode::Auto);
        let Err(LedgerError::InvalidDate { column, examples }) = result else {
            panic!("expected date error");
        };
        assert_eq!(column, "invoice_date");
        assert_eq!(examples, ["bad", "", "31/02/2024"]);
    }

    #[test]
    fn test_tag_amounts_column() {
        let mut cols = columns();
        cols.tag_amounts = Some("tag_amounts".to_string());
        let input = "company_id/vat,tax_tag_ids,balance,date,invoice_date,tag_amounts\n\
                     BG999,\"31,41\",,2024-03-31,01/03/2024,\"31=100.00; 41 = 20,00 ;\"\n";
        let batch = LedgerNormalizer::normalize(input.as_bytes(), &cols, &DateMode::Auto).unwrap();
        let row = &batch.rows[0];
        assert_eq!(row.tag_amounts["31"], dec!(100.00));
        assert_eq!(row.tag_amounts["41"], dec!(20.00));
        assert_eq!(row.balance, None);
    }

    #[test]
    fn test_malformed_tag_amount_is_fatal() {
        let mut cols = columns();
        cols.tag_amounts = Some("tag_amounts".to_string());
        let input = "company_id/vat,tax_tag_ids,balance,date,invoice_date,tag_amounts\n\
                     BG999,31,,2024-03-31,01/03/2024,31:100\n";
        let result = LedgerNormalizer::normalize(input.as_bytes(), &cols, &DateMode::Auto);
        assert!(matches!(result, Err(LedgerError::InvalidTagAmount { row: 0, .. })));
    }

    #[rstest]
    #[case("1 234,56", Some(dec!(1234.56)))]
    #[case("-10.5", Some(dec!(-10.5)))]
    #[case("1,234.56", None)]
    #[case("   ", None)]
    fn test_parse_amount(#[case] raw: &str, #[case] expected: Option<Decimal>) {
        match parse_amount(raw) {
            Ok(value) => assert_eq!(value, expected),
            Err(_) => assert_eq!(expected, None, "'{raw}' should parse"),
        }
    }

    #[rstest]
    #[case("", &[])]
    #[case(" 41 ", &["41"])]
    #[case("31,41,31", &["31", "41"])]
    #[case("21, ,11", &["11", "21"])]
    fn test_parse_tags(#[case] raw: &str, #[case] expected: &[&str]) {
        assert_eq!(parse_tags(raw), expected);
    }
}
