//! Plain-text run summary.

use std::fmt;

use super::output::OutputBundle;
use super::tax_return::{FilingContext, TaxReturn};

/// Number of warnings listed in the summary.
pub const SUMMARY_WARNING_LIMIT: usize = 50;

/// Counts and warnings of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Version of the producing application.
    pub app_version: String,
    /// Company VAT number.
    pub company_vat: String,
    /// Tax period as `YYYY-MM`.
    pub tax_period: String,
    /// Submitter person.
    pub submitter_person: String,
    /// Submitter personal identifier.
    pub submitter_id: String,
    /// Ledger rows read.
    pub ledger_row_count: usize,
    /// Purchase ledger rows written.
    pub purchases_row_count: usize,
    /// Sales ledger rows written.
    pub sales_row_count: usize,
    /// Trade declaration detail lines written.
    pub trade_detail_count: usize,
    /// Every warning message, in order.
    pub warnings: Vec<String>,
}

impl RunSummary {
    /// Collects the summary of a rendered return.
    #[must_use]
    pub fn new(
        app_version: &str,
        tax_return: &TaxReturn,
        bundle: &OutputBundle,
        context: &FilingContext,
    ) -> Self {
        Self {
            app_version: app_version.to_string(),
            company_vat: tax_return.company_vat.clone(),
            tax_period: tax_return.tax_period.to_string(),
            submitter_person: context.submitter_person.clone(),
            submitter_id: context.submitter_id.clone(),
            ledger_row_count: tax_return.ledger_row_count,
            purchases_row_count: tax_return.purchases.len(),
            sales_row_count: tax_return.sales.len(),
            trade_detail_count: tax_return.trade.details.len(),
            warnings: bundle.warnings.messages(),
        }
    }
}

/// One `key: value` line per field, then at most
/// [`SUMMARY_WARNING_LIMIT`] warnings as `- message` lines.
impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "app_version: {}", self.app_version)?;
        writeln!(f, "company_vat: {}", self.company_vat)?;
        writeln!(f, "tax_period: {}", self.tax_period)?;
        writeln!(f, "submitter_person: {}", self.submitter_person)?;
        writeln!(f, "submitter_egn: {}", self.submitter_id)?;
        writeln!(f, "ledger_row_count: {}", self.ledger_row_count)?;
        writeln!(f, "pokupki_row_count: {}", self.purchases_row_count)?;
        writeln!(f, "prodagbi_row_count: {}", self.sales_row_count)?;
        writeln!(f, "vies_vir_count: {}", self.trade_detail_count)?;
        writeln!(f, "warnings_count: {}", self.warnings.len())?;
        writeln!(f, "warnings_first_50:")?;
        for warning in self.warnings.iter().take(SUMMARY_WARNING_LIMIT) {
            writeln!(f, "- {warning}")?;
        }
        Ok(())
    }
}
