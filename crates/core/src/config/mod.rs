//! Engine configuration.
//!
//! Loads the JSON configuration set (tag mapping, ledger columns,
//! declaration rules and the four output schemas), decodes every document
//! into typed structs once, and cross-checks them against each other.

pub mod error;
pub mod loader;

pub use error::ConfigError;
pub use loader::{CONFIG_TYPES, EngineConfig, SUPPORTED_CONFIG_VERSION};
