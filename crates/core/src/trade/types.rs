//! Trade declaration types.

use std::slice;

use serde::Deserialize;

use crate::mapping::UNIDENTIFIED_COUNTERPARTY_VAT;
use crate::schema::Record;

/// Section codes in file order; the detail section comes last.
pub const SECTION_ORDER: [&str; 5] = ["VHR", "VDR", "VTR", "TTR", "VIR"];

/// Columns of the delimited detail mirror.
pub const DETAIL_CSV_COLUMNS: [&str; 5] = [
    "line_number",
    "counterparty_vat",
    "services_tax_base",
    "goods_tax_base",
    "triangular_tax_base",
];

/// Aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TradeConfig {
    /// Sales column summed per counterparty.
    pub amount_field: String,
    /// Counterparty VAT excluded from the declaration, taken from the
    /// tag mapping.
    #[serde(skip)]
    pub unidentified_counterparty_vat: String,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            amount_field: "base_services_21_2".to_string(),
            unidentified_counterparty_vat: UNIDENTIFIED_COUNTERPARTY_VAT.to_string(),
        }
    }
}

/// Run values copied into the declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeContext {
    /// Reporting period as `YYYYMM` or `MM/YYYY`; blank derives it from
    /// the sales rows.
    pub reporting_period: String,
    /// Declarer identifier.
    pub declarer_id: String,
    /// Declarer name.
    pub declarer_name: String,
    /// Registrant VAT number.
    pub registered_vat: String,
    /// Registrant name.
    pub registered_name: String,
    /// Registrant address.
    pub registered_address: String,
}

/// The multi-section trade declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeDeclaration {
    /// `VHR` record.
    pub header: Record,
    /// `VDR` record.
    pub declarer: Record,
    /// `VTR` record.
    pub registrant: Record,
    /// `TTR` record.
    pub totals: Record,
    /// `VIR` records, one per counterparty.
    pub details: Vec<Record>,
}

impl TradeDeclaration {
    /// Records per section, in file order.
    #[must_use]
    pub fn sections(&self) -> [(&'static str, &[Record]); 5] {
        [
            (SECTION_ORDER[0], slice::from_ref(&self.header)),
            (SECTION_ORDER[1], slice::from_ref(&self.declarer)),
            (SECTION_ORDER[2], slice::from_ref(&self.registrant)),
            (SECTION_ORDER[3], slice::from_ref(&self.totals)),
            (SECTION_ORDER[4], self.details.as_slice()),
        ]
    }
}
