//! Intra-community trade declaration (VIES).
//!
//! Aggregates the sales table per counterparty into the multi-section
//! declaration rendered by the fixed-width codec.

pub mod service;
pub mod types;

pub use service::{TradeService, reporting_period};
pub use types::{
    DETAIL_CSV_COLUMNS, SECTION_ORDER, TradeConfig, TradeContext, TradeDeclaration,
};
