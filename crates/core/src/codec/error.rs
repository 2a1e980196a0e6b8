//! Codec error types.

use thiserror::Error;

/// Errors that can occur while serializing or reading output records.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A field slot starts at column 0 or runs past the line length.
    #[error(
        "{schema}.{field}: slot {start_pos}+{length} exceeds line length {line_length}"
    )]
    FieldOutOfBounds {
        /// Schema name.
        schema: String,
        /// Field internal name.
        field: String,
        /// 1-based start column.
        start_pos: usize,
        /// Slot width.
        length: usize,
        /// Schema line length.
        line_length: usize,
    },

    /// A rendered or parsed line has the wrong character count.
    #[error("{schema}: line has {actual} characters, expected {expected}")]
    LineLengthMismatch {
        /// Schema name.
        schema: String,
        /// Schema line length.
        expected: usize,
        /// Actual character count.
        actual: usize,
    },

    /// A multi-section schema declares no fields for a section.
    #[error("{schema}: no fields found for section {section}")]
    MissingSection {
        /// Schema name.
        schema: String,
        /// Section code prefix.
        section: String,
    },

    /// The schema names an encoding label that is not recognized.
    #[error("Unknown file encoding: {0}")]
    UnknownEncoding(String),

    /// Text contains characters the target encoding cannot represent.
    #[error("{schema}: text cannot be encoded as {encoding}")]
    Unencodable {
        /// Schema name.
        schema: String,
        /// Encoding label.
        encoding: String,
    },

    /// A numeric slot did not hold a number.
    #[error("{schema}.{field}: '{value}' is not a number")]
    InvalidNumber {
        /// Schema name.
        schema: String,
        /// Field internal name.
        field: String,
        /// Offending slot content.
        value: String,
    },

    /// Delimited writer failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// In-memory buffer failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FieldOutOfBounds { .. } => "FIELD_OUT_OF_BOUNDS",
            Self::LineLengthMismatch { .. } => "LINE_LENGTH_MISMATCH",
            Self::MissingSection { .. } => "MISSING_SECTION",
            Self::UnknownEncoding(_) => "UNKNOWN_ENCODING",
            Self::Unencodable { .. } => "UNENCODABLE_TEXT",
            Self::InvalidNumber { .. } => "INVALID_NUMBER",
            Self::Csv(_) => "CSV_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }
}
