//! Schema-driven fixed-width line codec.
//!
//! A line is a buffer of exactly `line_length` characters. Every positioned
//! field owns the half-open range `[start_pos - 1, start_pos - 1 + length)`
//! and is written padded to its full width, so rendering never shifts other
//! fields. Lengths are counted in characters, not bytes; the byte encoding
//! is applied afterwards.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::CodecError;
use crate::schema::{Align, FieldValue, Record, SchemaField, TableSchema};
use crate::warning::{Warning, Warnings};

/// Fixed-width codec.
pub struct FixedWidthCodec;

impl FixedWidthCodec {
    /// Renders a record against every field of the schema.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::FieldOutOfBounds` when a slot does not fit the
    /// line, or `CodecError::LineLengthMismatch` if the result has the wrong
    /// length.
    pub fn render_line(
        record: &Record,
        schema: &TableSchema,
        warnings: &mut Warnings,
    ) -> Result<String, CodecError> {
        Self::render_fields(record, schema.fields.iter(), schema, warnings)
    }

    /// Renders a record against a subset of the schema's fields.
    ///
    /// Used for multi-section files where each section line carries only
    /// its own fields. Fields without a position are skipped.
    ///
    /// # Errors
    ///
    /// Same as [`FixedWidthCodec::render_line`].
    pub fn render_fields<'a>(
        record: &Record,
        fields: impl IntoIterator<Item = &'a SchemaField>,
        schema: &TableSchema,
        warnings: &mut Warnings,
    ) -> Result<String, CodecError> {
        let mut buffer = vec![' '; schema.line_length];

        for field in fields {
            let Some((start_pos, length)) = field.position() else {
                continue;
            };
            let range = slot_range(field, start_pos, length, schema)?;

            let mut value = format_value(record.get(&field.internal_name), field);
            if value.chars().count() > length {
                warnings.push(Warning::Truncated {
                    schema: schema.schema_name.clone(),
                    field: field.internal_name.clone(),
                    value: value.clone(),
                    length,
                });
                value = value.chars().take(length).collect();
            }

            let padded = pad(&value, length, field.align, field.pad());
            buffer[range].copy_from_slice(&padded);
        }

        let line: String = buffer.into_iter().collect();
        let actual = line.chars().count();
        if actual != schema.line_length {
            return Err(CodecError::LineLengthMismatch {
                schema: schema.schema_name.clone(),
                expected: schema.line_length,
                actual,
            });
        }
        Ok(line)
    }

    /// Reads a line back into a record.
    ///
    /// Padding is stripped on the alignment side. Numeric fields yield a
    /// decimal (an all-padding slot reads as zero), text fields yield text.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::LineLengthMismatch` for a line of the wrong
    /// length, `CodecError::FieldOutOfBounds` for an invalid slot and
    /// `CodecError::InvalidNumber` when a numeric slot holds text.
    pub fn parse_line(line: &str, schema: &TableSchema) -> Result<Record, CodecError> {
        let chars: Vec<char> = line.chars().collect();
        if chars.len() != schema.line_length {
            return Err(CodecError::LineLengthMismatch {
                schema: schema.schema_name.clone(),
                expected: schema.line_length,
                actual: chars.len(),
            });
        }

        let mut record = Record::new();
        for field in &schema.fields {
            let Some((start_pos, length)) = field.position() else {
                continue;
            };
            let range = slot_range(field, start_pos, length, schema)?;
            let slot: String = chars[range].iter().collect();

            let pad_char = field.pad();
            let stripped = match field.align {
                Align::Left => slot.trim_end_matches(pad_char),
                Align::Right => slot.trim_start_matches(pad_char),
            };

            let value = if field.is_numeric() {
                let text = stripped.trim();
                if text.is_empty() {
                    FieldValue::Number(Decimal::ZERO)
                } else {
                    let number =
                        Decimal::from_str(text).map_err(|_| CodecError::InvalidNumber {
                            schema: schema.schema_name.clone(),
                            field: field.internal_name.clone(),
                            value: slot.clone(),
                        })?;
                    FieldValue::Number(number)
                }
            } else {
                FieldValue::Text(stripped.to_string())
            };
            record.set(field.internal_name.clone(), value);
        }
        Ok(record)
    }
}

/// Converts a value to the text written into its slot.
///
/// Numeric fields with `decimals` are rounded half-to-even and printed with
/// exactly that many fraction digits. A text value in a numeric field is
/// read as a decimal when possible and passed through otherwise. Missing
/// values are empty.
#[must_use]
pub fn format_value(value: Option<&FieldValue>, field: &SchemaField) -> String {
    let Some(value) = value else {
        return String::new();
    };

    if !field.is_numeric() {
        return value.to_string();
    }

    let Some(number) = value.as_decimal() else {
        return value.to_string();
    };

    match field.decimals {
        Some(decimals) => format_decimal(number, decimals),
        None => number.to_string(),
    }
}

/// Fixed-point text of `value` with exactly `decimals` fraction digits.
#[must_use]
pub fn format_decimal(value: Decimal, decimals: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(decimals);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.to_string()
}

fn pad(value: &str, length: usize, align: Align, pad_char: char) -> Vec<char> {
    let fill = length.saturating_sub(value.chars().count());
    let padding = std::iter::repeat_n(pad_char, fill);
    match align {
        Align::Left => value.chars().chain(padding).collect(),
        Align::Right => padding.chain(value.chars()).collect(),
    }
}

fn slot_range(
    field: &SchemaField,
    start_pos: usize,
    length: usize,
    schema: &TableSchema,
) -> Result<std::ops::Range<usize>, CodecError> {
    let out_of_bounds = || CodecError::FieldOutOfBounds {
        schema: schema.schema_name.clone(),
        field: field.internal_name.clone(),
        start_pos,
        length,
        line_length: schema.line_length,
    };

    let start = start_pos.checked_sub(1).ok_or_else(out_of_bounds)?;
    let end = start.checked_add(length).ok_or_else(out_of_bounds)?;
    if end > schema.line_length {
        return Err(out_of_bounds());
    }
    Ok(start..end)
}
