//! Line assembly and byte encoding of fixed-width files.

use encoding_rs::Encoding;

use super::error::CodecError;
use crate::schema::TableSchema;

/// Joins lines, each followed by the schema newline, and encodes the text
/// with the schema's file encoding.
///
/// # Errors
///
/// Returns `CodecError::UnknownEncoding` for an unrecognized label or
/// `CodecError::Unencodable` when a character has no mapping.
pub fn encode_lines(lines: &[String], schema: &TableSchema) -> Result<Vec<u8>, CodecError> {
    let newline = schema.newline.as_str();
    let mut text = String::with_capacity(lines.len() * (schema.line_length + newline.len()));
    for line in lines {
        text.push_str(line);
        text.push_str(newline);
    }
    encode_text(&text, schema)
}

/// Encodes text with the schema's file encoding.
///
/// # Errors
///
/// See [`encode_lines`].
pub fn encode_text(text: &str, schema: &TableSchema) -> Result<Vec<u8>, CodecError> {
    let encoding = Encoding::for_label(schema.file_encoding.trim().as_bytes())
        .ok_or_else(|| CodecError::UnknownEncoding(schema.file_encoding.clone()))?;

    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(CodecError::Unencodable {
            schema: schema.schema_name.clone(),
            encoding: encoding.name().to_string(),
        });
    }
    Ok(bytes.into_owned())
}
