//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Input and output locations.
    pub paths: PathsConfig,
    /// Ledger parsing options.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Values about the person filing, copied into the declarations.
    #[serde(default)]
    pub submitter: SubmitterConfig,
}

/// File system locations for one run.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Ledger CSV export to process.
    pub input: PathBuf,
    /// Directory holding the JSON mapping and schema files.
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
    /// Directory the output files are written to. Must be fresh per run.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("configs")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// How ledger dates are parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateModeSetting {
    /// Try the common day-first and ISO formats in turn.
    #[default]
    Auto,
    /// Use `date_format` exclusively.
    Explicit,
}

/// Ledger parsing configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerConfig {
    /// Date parsing mode.
    #[serde(default)]
    pub date_mode: DateModeSetting,
    /// `strftime`-style format, required when `date_mode` is `explicit`.
    #[serde(default)]
    pub date_format: Option<String>,
}

/// Submitter details.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitterConfig {
    /// Person submitting the declaration.
    #[serde(default)]
    pub person: String,
    /// Personal identifier of the submitter (EGN), reported in the run summary.
    #[serde(default)]
    pub personal_id: String,
    /// Declarer identifier for the trade declaration.
    #[serde(default)]
    pub declarer_id: String,
    /// Registered address of the taxpayer.
    #[serde(default)]
    pub registered_address: String,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("VATTOOL").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
