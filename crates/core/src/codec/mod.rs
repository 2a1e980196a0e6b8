//! Output serialization.
//!
//! This module turns schema-shaped records into the filed text forms:
//! - Fixed-width lines positioned by the schema
//! - Multi-section files grouped by field code prefix
//! - Byte encoding and line termination per schema
//! - The delimited (CSV) mirror

pub mod delimited;
pub mod encoding;
pub mod error;
pub mod fixed_width;
pub mod sections;

#[cfg(test)]
mod codec_props;

pub use delimited::{write_records, write_table};
pub use encoding::{encode_lines, encode_text};
pub use error::CodecError;
pub use fixed_width::{FixedWidthCodec, format_decimal, format_value};
pub use sections::{group_by_section, render_sections};

use crate::schema::{Record, TableSchema};
use crate::warning::Warnings;

/// Renders every record as one line and encodes the file.
///
/// # Errors
///
/// Returns any rendering or encoding error.
pub fn render_file(
    records: &[Record],
    schema: &TableSchema,
    warnings: &mut Warnings,
) -> Result<Vec<u8>, CodecError> {
    let lines = records
        .iter()
        .map(|record| FixedWidthCodec::render_line(record, schema, warnings))
        .collect::<Result<Vec<_>, _>>()?;
    encode_lines(&lines, schema)
}
