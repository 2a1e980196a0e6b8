//! Trade declaration aggregation.
//!
//! Sales rows are grouped by counterparty VAT number. Each group becomes
//! one numbered detail record.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use vattool_shared::TaxPeriod;

use super::types::{TradeConfig, TradeContext, TradeDeclaration};
use crate::schema::{FieldValue, Record};

/// Trade declaration aggregation service.
pub struct TradeService;

impl TradeService {
    /// Builds the trade declaration from the sales table.
    ///
    /// Steps:
    /// 1. Sum the amount field per trimmed counterparty VAT
    /// 2. Skip blank and unidentified VATs and zero amounts
    /// 3. Number the details in VAT order
    /// 4. Build the header, declarer, registrant and totals records
    #[must_use]
    pub fn build(sales: &[Record], context: &TradeContext, config: &TradeConfig) -> TradeDeclaration {
        // 1-2. Group
        let mut groups: BTreeMap<String, Decimal> = BTreeMap::new();
        for row in sales {
            let vat = row.text("counterparty_vat");
            let vat = vat.trim();
            let amount = row.decimal(&config.amount_field);
            if vat.is_empty() || vat == config.unidentified_counterparty_vat || amount.is_zero() {
                continue;
            }
            *groups.entry(vat.to_string()).or_default() += amount;
        }

        // 3. Details
        let details: Vec<Record> = groups
            .iter()
            .enumerate()
            .map(|(i, (vat, total))| {
                section([
                    ("vir_section_code", FieldValue::from("VIR")),
                    ("line_number", Decimal::from(i + 1).into()),
                    ("counterparty_vat", vat.as_str().into()),
                    ("services_tax_base", (*total).into()),
                    ("goods_tax_base", Decimal::ZERO.into()),
                    ("triangular_tax_base", Decimal::ZERO.into()),
                    ("vir_reporting_period", "".into()),
                ])
            })
            .collect();
        let total_tax_base: Decimal = groups.values().copied().sum();

        // 4. Fixed sections
        let period = reporting_period(&context.reporting_period, sales);
        let header = section([
            ("vhr_section_code", FieldValue::from("VHR")),
            ("reporting_period", period.into()),
            ("total_record_count", Decimal::from(details.len()).into()),
        ]);
        let declarer = section([
            ("vdr_section_code", FieldValue::from("VDR")),
            ("declarer_id", context.declarer_id.as_str().into()),
            ("declarer_name", context.declarer_name.as_str().into()),
            ("declarer_city", "".into()),
            ("declarer_postal_code", Decimal::ZERO.into()),
            ("declarer_address", "".into()),
            ("declarer_person_type", "".into()),
        ]);
        let registrant = section([
            ("vtr_section_code", FieldValue::from("VTR")),
            ("registered_vat_number", context.registered_vat.as_str().into()),
            ("registered_name", context.registered_name.as_str().into()),
            ("registered_address", context.registered_address.as_str().into()),
        ]);
        let totals = section([
            ("ttr_section_code", FieldValue::from("TTR")),
            ("total_tax_base", total_tax_base.into()),
            ("vod_tax_base", Decimal::ZERO.into()),
        ]);

        tracing::debug!(
            sales = sales.len(),
            details = details.len(),
            "Trade declaration built"
        );

        TradeDeclaration {
            header,
            declarer,
            registrant,
            totals,
            details,
        }
    }
}

fn section<const N: usize>(fields: [(&str, FieldValue); N]) -> Record {
    fields.into_iter().collect()
}

/// Reporting period as `MM/YYYY`.
///
/// The given value may be `YYYYMM` or `MM/YYYY`. Otherwise the first sales
/// row's `tax_period` is used when it is `YYYYMM`; failing that the period
/// is blank.
#[must_use]
pub fn reporting_period(given: &str, sales: &[Record]) -> String {
    let given = given.trim();
    if let Some(period) = TaxPeriod::parse_yyyymm(given) {
        return period.mm_yyyy();
    }
    if TaxPeriod::parse_mm_yyyy(given).is_some() {
        return given.to_string();
    }
    sales
        .first()
        .and_then(|row| TaxPeriod::parse_yyyymm(row.text("tax_period").trim()))
        .map(|period| period.mm_yyyy())
        .unwrap_or_default()
}
