//! Non-fatal findings collected during a run.
//!
//! Warnings never change control flow. They are accumulated in step order
//! and rendered as plain text for the run summary.

use std::fmt;

use rust_decimal::Decimal;

/// A single non-fatal finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Row carries tags that have no mapping entry.
    UnknownTags {
        /// Source row index.
        row: usize,
        /// Unmapped tags, sorted.
        tags: Vec<String>,
    },
    /// Document type did not start with two digits and was kept as-is.
    UnrecognizedDocumentType {
        /// Source row index.
        row: usize,
        /// Trimmed raw value.
        value: String,
    },
    /// A mapped tag had no per-tag amount on the row.
    MissingTagAmount {
        /// Source row index.
        row: usize,
        /// Tag without an amount.
        tag: String,
    },
    /// A value was longer than its fixed-width slot.
    Truncated {
        /// Schema the record was rendered against.
        schema: String,
        /// Field internal name.
        field: String,
        /// Full value before truncation.
        value: String,
        /// Slot length the value was cut to.
        length: usize,
    },
    /// Due and refundable VAT were recomputed from the delta and differ
    /// from the rule output.
    DueRefundableRecalculated {
        /// `sales_total_vat - total_tax_credit`.
        delta: Decimal,
        /// Recomputed VAT due.
        due: Decimal,
        /// Recomputed VAT refundable.
        refundable: Decimal,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTags { row, tags } => {
                write!(f, "Row {row}: unknown tags skipped: {}", tags.join(", "))
            }
            Self::UnrecognizedDocumentType { row, value } => write!(
                f,
                "Row {row}: unrecognized document type '{value}', kept as-is"
            ),
            Self::MissingTagAmount { row, tag } => {
                write!(f, "Row {row}: no amount for tag '{tag}', tag skipped")
            }
            Self::Truncated {
                schema,
                field,
                value,
                length,
            } => write!(
                f,
                "{schema}.{field}: value '{value}' truncated to {length} characters"
            ),
            Self::DueRefundableRecalculated {
                delta,
                due,
                refundable,
            } => write!(
                f,
                "VAT due/refundable recalculated from delta {delta}: due {due}, refundable {refundable}"
            ),
        }
    }
}

/// Ordered warning collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warnings(Vec<Warning>);

impl Warnings {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning and logs it.
    pub fn push(&mut self, warning: Warning) {
        tracing::warn!(warning = %warning, "Filing warning");
        self.0.push(warning);
    }

    /// Appends another collection, keeping order. Already logged.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Number of warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no warning was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates warnings in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.0.iter()
    }

    /// Human-readable messages, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_messages_keep_order() {
        let mut warnings = Warnings::new();
        warnings.push(Warning::UnknownTags {
            row: 3,
            tags: vec!["77".to_string(), "99".to_string()],
        });
        warnings.push(Warning::DueRefundableRecalculated {
            delta: dec!(-20.00),
            due: dec!(0),
            refundable: dec!(20.00),
        });

        let messages = warnings.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "Row 3: unknown tags skipped: 77, 99");
        assert!(messages[1].contains("refundable 20.00"));
    }

    #[test]
    fn test_extend_appends() {
        let mut first = Warnings::new();
        first.push(Warning::MissingTagAmount {
            row: 0,
            tag: "41".to_string(),
        });
        let mut second = Warnings::new();
        second.push(Warning::UnrecognizedDocumentType {
            row: 1,
            value: "X".to_string(),
        });
        first.extend(second);
        assert_eq!(first.len(), 2);
        assert!(matches!(
            first.iter().last(),
            Some(Warning::UnrecognizedDocumentType { row: 1, .. })
        ));
    }
}
