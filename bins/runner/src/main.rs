//! VAT filing runner
//!
//! Reads one ledger export and writes the monthly filing set.

use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vattool_core::ledger::{DateMode, LedgerNormalizer};
use vattool_core::{EngineConfig, FilingContext, RunSummary, TaxReturn};
use vattool_shared::AppConfig;

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vattool=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;
    let engine = EngineConfig::load(&config.paths.config_dir)?;
    let date_mode =
        DateMode::from_settings(config.ledger.date_mode, config.ledger.date_format.as_deref())?;
    ensure_fresh(&config.paths.output_dir)?;

    // Read and normalize the ledger
    let input = fs::read(&config.paths.input)
        .with_context(|| format!("Failed to read {}", config.paths.input.display()))?;
    let batch = LedgerNormalizer::normalize(input.as_slice(), &engine.ledger_columns, &date_mode)?;
    info!(
        rows = batch.rows.len(),
        company_vat = %batch.company_vat,
        "Ledger normalized"
    );

    // Build and render the return
    let context = FilingContext {
        submitter_person: config.submitter.person.clone(),
        submitter_id: config.submitter.personal_id.clone(),
        declarer_id: config.submitter.declarer_id.clone(),
        registered_address: config.submitter.registered_address.clone(),
    };
    let tax_return = TaxReturn::build(&batch, &engine, &context)?;
    let mut bundle = tax_return.render(&engine.schemas)?;

    let summary = RunSummary::new(env!("CARGO_PKG_VERSION"), &tax_return, &bundle, &context);
    bundle.add("run_summary.txt", summary.to_string().into_bytes());
    bundle.add("input_original.csv", input);

    // Write everything
    bundle.write_to(&config.paths.output_dir)?;
    info!(
        output_dir = %config.paths.output_dir.display(),
        warnings = bundle.warnings.len(),
        "Filing written"
    );

    println!("OUTPUT DIR: {}", config.paths.output_dir.display());
    println!("WARNINGS: {}", bundle.warnings.len());
    Ok(())
}

/// Fails when the output directory already holds files.
fn ensure_fresh(dir: &Path) -> anyhow::Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    let mut entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    if entries.next().is_some() {
        bail!("Output directory {} is not empty", dir.display());
    }
    Ok(())
}
