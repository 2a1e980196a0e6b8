//! Building and rendering one monthly tax return.

use vattool_shared::TaxPeriod;

use super::error::EngineError;
use super::output::OutputBundle;
use crate::codec::{encode_lines, render_file, render_sections, write_records, write_table};
use crate::config::EngineConfig;
use crate::declaration::{DeclarationContext, DeclarationService};
use crate::ledger::LedgerBatch;
use crate::mapping::MappingService;
use crate::schema::{Record, SchemaSet};
use crate::trade::{DETAIL_CSV_COLUMNS, TradeContext, TradeDeclaration, TradeService};
use crate::warning::Warnings;

/// Submitter values supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilingContext {
    /// Person submitting the return.
    pub submitter_person: String,
    /// Personal identifier of the submitter, reported in the run summary only.
    pub submitter_id: String,
    /// Declarer identifier of the trade declaration.
    pub declarer_id: String,
    /// Registered address of the taxpayer.
    pub registered_address: String,
}

/// All filing records of one company and tax period.
#[derive(Debug, Clone)]
pub struct TaxReturn {
    /// Company VAT number.
    pub company_vat: String,
    /// Company name, possibly empty.
    pub company_name: String,
    /// Tax period of the return.
    pub tax_period: TaxPeriod,
    /// Number of ledger rows read.
    pub ledger_row_count: usize,
    /// Purchase ledger rows.
    pub purchases: Vec<Record>,
    /// Sales ledger rows.
    pub sales: Vec<Record>,
    /// Declaration record.
    pub declaration: Record,
    /// Trade declaration.
    pub trade: TradeDeclaration,
    /// Mapping and declaration findings, in step order.
    pub warnings: Warnings,
}

impl TaxReturn {
    /// Builds the return from a normalized ledger.
    ///
    /// Steps:
    /// 1. Require exactly one tax period
    /// 2. Map ledger rows to the purchase and sales tables
    /// 3. Aggregate the declaration
    /// 4. Aggregate the trade declaration
    ///
    /// # Errors
    ///
    /// Returns `EngineError::TaxPeriodCount` when the ledger covers zero or
    /// several periods, or any mapping error.
    pub fn build(
        batch: &LedgerBatch,
        config: &EngineConfig,
        context: &FilingContext,
    ) -> Result<Self, EngineError> {
        // 1. Single period
        let [tax_period] = batch.tax_periods.as_slice() else {
            return Err(EngineError::TaxPeriodCount(batch.tax_periods.clone()));
        };
        let tax_period = *tax_period;

        // 2. Mapping
        let mapped = MappingService::map(&batch.rows, &config.mapping, &config.schemas)?;
        let mut warnings = mapped.warnings;

        // 3. Declaration
        let declaration = DeclarationService::build(
            &mapped.purchases,
            &mapped.sales,
            &config.declaration,
            &config.schemas.declaration,
            &DeclarationContext {
                taxpayer_name: batch.company_name.clone(),
                submitter_person: context.submitter_person.clone(),
            },
        );
        warnings.extend(declaration.warnings);

        // 4. Trade declaration
        let trade = TradeService::build(
            &mapped.sales,
            &TradeContext {
                reporting_period: tax_period.mm_yyyy(),
                declarer_id: context.declarer_id.clone(),
                declarer_name: context.submitter_person.clone(),
                registered_vat: batch.company_vat.clone(),
                registered_name: batch.company_name.clone(),
                registered_address: context.registered_address.clone(),
            },
            &config.trade,
        );

        tracing::info!(
            company_vat = %batch.company_vat,
            tax_period = %tax_period,
            purchases = mapped.purchases.len(),
            sales = mapped.sales.len(),
            trade_details = trade.details.len(),
            warnings = warnings.len(),
            "Tax return built"
        );

        Ok(Self {
            company_vat: batch.company_vat.clone(),
            company_name: batch.company_name.clone(),
            tax_period,
            ledger_row_count: batch.rows.len(),
            purchases: mapped.purchases,
            sales: mapped.sales,
            declaration: declaration.record,
            trade,
            warnings,
        })
    }

    /// Renders every output file into memory.
    ///
    /// Codec warnings are appended after the return's own warnings. Nothing
    /// is written to disk.
    ///
    /// # Errors
    ///
    /// Returns the first codec error; no partial bundle is produced.
    pub fn render(&self, schemas: &SchemaSet) -> Result<OutputBundle, EngineError> {
        let mut warnings = self.warnings.clone();
        let mut bundle = OutputBundle::default();
        let declaration = std::slice::from_ref(&self.declaration);

        bundle.add("pokupki.csv", write_table(&self.purchases, &schemas.purchases)?);
        bundle.add(
            "pokupki.txt",
            render_file(&self.purchases, &schemas.purchases, &mut warnings)?,
        );
        bundle.add("prodagbi.csv", write_table(&self.sales, &schemas.sales)?);
        bundle.add(
            "prodagbi.txt",
            render_file(&self.sales, &schemas.sales, &mut warnings)?,
        );
        bundle.add("deklar.csv", write_table(declaration, &schemas.declaration)?);
        bundle.add(
            "deklar.txt",
            render_file(declaration, &schemas.declaration, &mut warnings)?,
        );
        bundle.add(
            "vies.csv",
            write_records(&self.trade.details, &DETAIL_CSV_COLUMNS)?,
        );
        let vies_lines = render_sections(&self.trade.sections(), &schemas.trade, &mut warnings)?;
        bundle.add("vies.txt", encode_lines(&vies_lines, &schemas.trade)?);

        bundle.warnings = warnings;
        tracing::debug!(
            files = bundle.files().len(),
            warnings = bundle.warnings.len(),
            "Output rendered"
        );
        Ok(bundle)
    }
}
