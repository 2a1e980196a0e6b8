//! Multi-section fixed-width files.
//!
//! Some filings share one schema across several record kinds. The kind is
//! the field code prefix before `-` (`VIR-03` belongs to `VIR`), and each
//! section line is rendered from that section's fields only.

use std::collections::BTreeMap;

use super::error::CodecError;
use super::fixed_width::FixedWidthCodec;
use crate::schema::{Record, SchemaField, TableSchema};
use crate::warning::Warnings;

/// Groups schema fields by code prefix, keeping declaration order within
/// each section. Fields whose code has no `-` belong to no section.
#[must_use]
pub fn group_by_section(fields: &[SchemaField]) -> BTreeMap<&str, Vec<&SchemaField>> {
    let mut sections: BTreeMap<&str, Vec<&SchemaField>> = BTreeMap::new();
    for field in fields {
        if let Some(section) = field.section() {
            sections.entry(section).or_default().push(field);
        }
    }
    sections
}

/// Renders section records in the given order, one line per record.
///
/// Every listed section must have fields in the schema, even when it has
/// no records to render.
///
/// # Errors
///
/// Returns `CodecError::MissingSection` for a section without fields, or
/// any error from [`FixedWidthCodec::render_fields`].
pub fn render_sections(
    parts: &[(&str, &[Record])],
    schema: &TableSchema,
    warnings: &mut Warnings,
) -> Result<Vec<String>, CodecError> {
    let sections = group_by_section(&schema.fields);

    let mut lines = Vec::new();
    for (section, records) in parts {
        let fields = sections
            .get(section)
            .ok_or_else(|| CodecError::MissingSection {
                schema: schema.schema_name.clone(),
                section: (*section).to_string(),
            })?;

        for record in *records {
            lines.push(FixedWidthCodec::render_fields(
                record,
                fields.iter().copied(),
                schema,
                warnings,
            )?);
        }
    }
    Ok(lines)
}
