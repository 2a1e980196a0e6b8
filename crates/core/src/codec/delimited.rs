//! Delimited (CSV) mirror of the fixed-width files.
//!
//! UTF-8, comma separated, CRLF terminated, minimal quoting. The header is
//! written even when there are no rows.

use csv::{Terminator, WriterBuilder};

use super::error::CodecError;
use crate::schema::{Record, TableSchema};

/// Writes records with the schema's field order as columns.
///
/// # Errors
///
/// Returns `CodecError::Csv` if a record cannot be written.
pub fn write_table(records: &[Record], schema: &TableSchema) -> Result<Vec<u8>, CodecError> {
    write_records(records, &schema.column_names())
}

/// Writes records with an explicit column list. Missing values are empty.
///
/// # Errors
///
/// Returns `CodecError::Csv` if a record cannot be written.
pub fn write_records(records: &[Record], columns: &[&str]) -> Result<Vec<u8>, CodecError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|column| record.text(column)))?;
    }

    writer
        .into_inner()
        .map_err(|e| CodecError::Io(e.into_error()))
}
