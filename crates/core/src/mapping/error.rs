//! Mapping error types.

use thiserror::Error;

use crate::schema::Table;

/// Errors that abort the mapping step.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Two distinct tags on one row write the same output column.
    #[error(
        "Collision in row {row} (document_number={document_number}): tags involved: [{first_tag}, {second_tag}], conflicting column: {table}.{column}"
    )]
    Collision {
        /// Source row index.
        row: usize,
        /// Tag that wrote the column first.
        first_tag: String,
        /// Tag that tried to write it again.
        second_tag: String,
        /// Resolved document number of the row.
        document_number: String,
        /// Output table.
        table: Table,
        /// Output column.
        column: String,
    },

    /// A target or derived total names a column the table schema lacks.
    #[error("Unknown column {table}.{column}")]
    UnknownColumn {
        /// Output table.
        table: Table,
        /// Column name.
        column: String,
    },
}

impl MappingError {
    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Collision { .. } => "TAG_COLLISION",
            Self::UnknownColumn { .. } => "UNKNOWN_COLUMN",
        }
    }
}
