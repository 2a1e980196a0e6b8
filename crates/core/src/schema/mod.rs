//! Output schemas and the rows shaped by them.

pub mod record;
pub mod types;

pub use record::{FieldValue, Record};
pub use types::{Align, FieldType, Newline, SchemaField, SchemaSet, Table, TableSchema};
