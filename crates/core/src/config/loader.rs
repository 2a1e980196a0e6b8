//! Engine configuration loading and cross-checks.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ConfigError;
use crate::declaration::{DeclarationRules, Expression};
use crate::ledger::LedgerColumns;
use crate::mapping::TaxGridMapping;
use crate::schema::{SchemaSet, TableSchema};
use crate::trade::TradeConfig;

/// Configuration version this build reads.
pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// `config_type` of every document in the set.
pub const CONFIG_TYPES: [&str; 7] = [
    "tax_grid_mapping",
    "ledger_columns",
    "deklar_aggregation",
    "pokupki",
    "prodagbi",
    "deklar",
    "vies",
];

#[derive(Deserialize)]
struct Header {
    config_type: String,
    config_version: u32,
}

struct Document {
    origin: String,
    body: Value,
}

/// The complete, validated engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tag mapping rules.
    pub mapping: TaxGridMapping,
    /// Ledger CSV column names.
    pub ledger_columns: LedgerColumns,
    /// Declaration aggregation rules.
    pub declaration: DeclarationRules,
    /// Output schemas.
    pub schemas: SchemaSet,
    /// Trade declaration settings.
    pub trade: TradeConfig,
}

impl EngineConfig {
    /// Loads every `*.json` file of a directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the directory or a file cannot be
    /// read, or any error from [`EngineConfig::from_sources`].
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error(dir))? {
            let path = entry.map_err(io_error(dir))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let text = fs::read_to_string(&path).map_err(io_error(&path))?;
            sources.push((path.display().to_string(), text));
        }

        tracing::debug!(dir = %dir.display(), files = sources.len(), "Loading configuration");
        Self::from_sources(sources)
    }

    /// Builds the configuration from `(origin, json)` documents.
    ///
    /// Documents are matched by their `config_type`; exactly one document
    /// of each type in [`CONFIG_TYPES`] is required.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for unreadable JSON, an unsupported
    /// version, a missing or duplicated type, or a failed cross-check.
    pub fn from_sources<I, S, T>(sources: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: AsRef<str>,
    {
        // 1. Parse and group by type
        let mut by_type: BTreeMap<String, Vec<Document>> = BTreeMap::new();
        for (origin, text) in sources {
            let origin = origin.into();
            let body: Value = serde_json::from_str(text.as_ref()).map_err(|source| {
                ConfigError::Json {
                    path: origin.clone(),
                    source,
                }
            })?;
            let header = Header::deserialize(&body).map_err(|source| ConfigError::Json {
                path: origin.clone(),
                source,
            })?;
            if header.config_version != SUPPORTED_CONFIG_VERSION {
                return Err(ConfigError::UnsupportedVersion {
                    path: origin,
                    version: header.config_version,
                    supported: SUPPORTED_CONFIG_VERSION,
                });
            }
            by_type
                .entry(header.config_type)
                .or_default()
                .push(Document { origin, body });
        }

        // 2. Decode one document per type
        let mut take = |config_type: &str| {
            let documents = by_type.remove(config_type).unwrap_or_default();
            let found = documents.len();
            match (documents.into_iter().next(), found) {
                (Some(document), 1) => Ok(document),
                _ => Err(ConfigError::ConfigCount {
                    config_type: config_type.to_string(),
                    found,
                }),
            }
        };

        let mapping: TaxGridMapping = decode(take("tax_grid_mapping")?)?;
        let ledger_columns: LedgerColumns = decode(take("ledger_columns")?)?;
        let declaration: DeclarationRules = decode(take("deklar_aggregation")?)?;
        let vies = take("vies")?;
        let aggregation = vies.body.get("aggregation").map(|body| Document {
            origin: vies.origin.clone(),
            body: body.clone(),
        });
        let schemas = SchemaSet {
            purchases: decode(take("pokupki")?)?,
            sales: decode(take("prodagbi")?)?,
            declaration: decode(take("deklar")?)?,
            trade: decode(vies)?,
        };
        let mut trade: TradeConfig = match aggregation {
            Some(document) => decode(document)?,
            None => TradeConfig::default(),
        };
        trade
            .unidentified_counterparty_vat
            .clone_from(&mapping.unidentified_counterparty_vat);

        let config = Self {
            mapping,
            ledger_columns,
            declaration,
            schemas,
            trade,
        };

        // 3. Cross-check
        config.validate()?;

        tracing::debug!(
            tags = config.mapping.tags.len(),
            field_rules = config.declaration.field_rules.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Cross-checks the documents against each other.
    ///
    /// # Errors
    ///
    /// Returns the first failed check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for schema in [
            &self.schemas.purchases,
            &self.schemas.sales,
            &self.schemas.declaration,
            &self.schemas.trade,
        ] {
            validate_schema(schema)?;
        }
        validate_mapping(&self.mapping, &self.schemas)?;
        validate_declaration(&self.declaration, &self.schemas)?;
        validate_trade(&self.trade, &self.schemas)?;
        self.ledger_columns.validate()?;
        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError {
    let path = path.display().to_string();
    move |source| ConfigError::Io { path, source }
}

fn decode<T: DeserializeOwned>(document: Document) -> Result<T, ConfigError> {
    serde_json::from_value(document.body).map_err(|source| ConfigError::Json {
        path: document.origin,
        source,
    })
}

fn validate_schema(schema: &TableSchema) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for field in &schema.fields {
        if !seen.insert(field.internal_name.as_str()) {
            return Err(ConfigError::DuplicateField {
                schema: schema.schema_name.clone(),
                field: field.internal_name.clone(),
            });
        }
    }
    Ok(())
}

fn validate_mapping(mapping: &TaxGridMapping, schemas: &SchemaSet) -> Result<(), ConfigError> {
    for (tag, rule) in &mapping.tags {
        let mut seen = BTreeSet::new();
        for target in &rule.targets {
            if !seen.insert((target.table, target.amount_column.as_str())) {
                return Err(ConfigError::DuplicateTarget {
                    tag: tag.clone(),
                    table: target.table,
                    column: target.amount_column.clone(),
                });
            }

            let Some(field) = schemas.table(target.table).field(&target.amount_column) else {
                return Err(ConfigError::UnknownTargetColumn {
                    tag: tag.clone(),
                    table: target.table,
                    column: target.amount_column.clone(),
                });
            };
            if !field.is_amount {
                tracing::warn!(
                    tag = %tag,
                    table = %target.table,
                    column = %target.amount_column,
                    "Tag target is not marked is_amount"
                );
            }
        }
    }

    for total in &mapping.derived_totals {
        let schema = schemas.table(total.table);
        let unknown = std::iter::once(&total.target_field)
            .chain(&total.components)
            .find(|column| schema.field(column).is_none());
        if let Some(column) = unknown {
            return Err(ConfigError::UnknownDerivedColumn {
                table: total.table,
                column: column.clone(),
            });
        }
    }
    Ok(())
}

fn validate_trade(trade: &TradeConfig, schemas: &SchemaSet) -> Result<(), ConfigError> {
    match schemas.sales.field(&trade.amount_field) {
        Some(field) if field.is_numeric() => Ok(()),
        _ => Err(ConfigError::UnknownTradeAmountField(trade.amount_field.clone())),
    }
}

fn validate_declaration(rules: &DeclarationRules, schemas: &SchemaSet) -> Result<(), ConfigError> {
    let known = |name: &str| schemas.declaration.field(name).is_some();

    for rule in &rules.field_rules {
        if !known(&rule.target_field) {
            return Err(ConfigError::UnknownDeclarationField(rule.target_field.clone()));
        }
        validate_expression(&rule.expression, &rule.target_field, schemas)?;
    }

    for (target_field, rule) in &rules.document_count_rules {
        if !known(target_field) {
            return Err(ConfigError::UnknownDeclarationField(target_field.clone()));
        }
        let schema = schemas.table(rule.source_table);
        if let Some(field) = rule
            .distinct_key_fields
            .iter()
            .find(|field| schema.field(field).is_none())
        {
            return Err(ConfigError::UnknownSourceField {
                target_field: target_field.clone(),
                table: rule.source_table,
                field: field.clone(),
            });
        }
    }
    Ok(())
}

fn validate_expression(
    expression: &Expression,
    target_field: &str,
    schemas: &SchemaSet,
) -> Result<(), ConfigError> {
    match expression {
        Expression::Sum { sources } => {
            if sources.is_empty() {
                return Err(ConfigError::EmptySum(target_field.to_string()));
            }
            for source in sources {
                if schemas.table(source.table).field(&source.field).is_none() {
                    return Err(ConfigError::UnknownSourceField {
                        target_field: target_field.to_string(),
                        table: source.table,
                        field: source.field.clone(),
                    });
                }
            }
            Ok(())
        }
        Expression::Subtract { left, right } => {
            validate_expression(left, target_field, schemas)?;
            validate_expression(right, target_field, schemas)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::AmountSource;
    use serde_json::json;

    const SHIPPED: [(&str, &str); 7] = [
        (
            "tax-grid-mapping.json",
            include_str!("../../../../configs/tax-grid-mapping.json"),
        ),
        (
            "ledger-columns.json",
            include_str!("../../../../configs/ledger-columns.json"),
        ),
        (
            "deklar-aggregation.json",
            include_str!("../../../../configs/deklar-aggregation.json"),
        ),
        (
            "pokupki-schema.json",
            include_str!("../../../../configs/pokupki-schema.json"),
        ),
        (
            "prodagbi-schema.json",
            include_str!("../../../../configs/prodagbi-schema.json"),
        ),
        (
            "deklar-schema.json",
            include_str!("../../../../configs/deklar-schema.json"),
        ),
        (
            "vies-schema.json",
            include_str!("../../../../configs/vies-schema.json"),
        ),
    ];

    /// Shipped documents with one of them edited.
    fn edited(name: &str, edit: impl FnOnce(&mut Value)) -> Vec<(String, String)> {
        let mut edit = Some(edit);
        SHIPPED
            .iter()
            .map(|(origin, text)| {
                let mut value: Value = serde_json::from_str(text).unwrap();
                if *origin == name
                    && let Some(edit) = edit.take()
                {
                    edit(&mut value);
                }
                ((*origin).to_string(), value.to_string())
            })
            .collect()
    }

    #[test]
    fn test_shipped_configuration_loads() {
        let config = EngineConfig::from_sources(SHIPPED).unwrap();

        assert_eq!(config.schemas.purchases.line_length, 274);
        assert_eq!(config.schemas.sales.line_length, 424);
        assert_eq!(config.schemas.declaration.line_length, 590);
        assert_eq!(config.schemas.trade.line_length, 373);
        assert_eq!(config.mapping.amount_source, AmountSource::RowBalance);
        assert!(config.mapping.rule("41").is_some());
        assert_eq!(config.trade.amount_field, "base_services_21_2");
        assert_eq!(config.trade.unidentified_counterparty_vat, "9999999999999");
        assert_eq!(config.declaration.document_count_rules.len(), 2);
    }

    #[test]
    fn test_missing_document_type() {
        let sources = SHIPPED.iter().filter(|(origin, _)| *origin != "vies-schema.json").copied();
        let err = EngineConfig::from_sources(sources).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigCount { ref config_type, found: 0 } if config_type == "vies"));
    }

    #[test]
    fn test_duplicated_document_type() {
        let mut sources: Vec<(&str, &str)> = SHIPPED.to_vec();
        sources.push(("copy.json", SHIPPED[0].1));
        let err = EngineConfig::from_sources(sources).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigCount { found: 2, .. }));
        assert_eq!(err.error_code(), "CONFIG_COUNT");
    }

    #[test]
    fn test_unsupported_version() {
        let sources = edited("ledger-columns.json", |v| v["config_version"] = json!(2));
        let err = EngineConfig::from_sources(sources).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion { version: 2, .. }));
    }

    #[test]
    fn test_invalid_json_names_origin() {
        let mut sources: Vec<(&str, &str)> = SHIPPED.to_vec();
        sources[1].1 = "{ not json";
        let err = EngineConfig::from_sources(sources).unwrap_err();
        assert!(err.to_string().starts_with("ledger-columns.json:"));
    }

    #[test]
    fn test_unknown_target_column() {
        let sources = edited("tax-grid-mapping.json", |v| {
            v["tags"]["41"]["targets"][0]["amount_column"] = json!("no_such_column");
        });
        let err = EngineConfig::from_sources(sources).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTargetColumn { ref tag, .. } if tag == "41"));
    }

    #[test]
    fn test_duplicate_target() {
        let sources = edited("tax-grid-mapping.json", |v| {
            let target = v["tags"]["41"]["targets"][0].clone();
            if let Some(targets) = v["tags"]["41"]["targets"].as_array_mut() {
                targets.push(target);
            }
        });
        let err = EngineConfig::from_sources(sources).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTarget { .. }));
    }

    #[test]
    fn test_invalid_sign() {
        let sources = edited("tax-grid-mapping.json", |v| {
            v["tags"]["41"]["targets"][0]["sign"] = json!(2);
        });
        let err = EngineConfig::from_sources(sources).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn test_duplicate_schema_field() {
        let sources = edited("deklar-schema.json", |v| {
            let field = v["fields"][0].clone();
            if let Some(fields) = v["fields"].as_array_mut() {
                fields.push(field);
            }
        });
        let err = EngineConfig::from_sources(sources).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateField { ref field, .. } if field == "vat_number"));
    }

    #[test]
    fn test_unknown_declaration_target() {
        let sources = edited("deklar-aggregation.json", |v| {
            v["field_rules"][0]["target_field"] = json!("no_such_field");
        });
        let err = EngineConfig::from_sources(sources).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDeclarationField(_)));
    }

    #[test]
    fn test_empty_sum_and_unknown_source() {
        let empty = edited("deklar-aggregation.json", |v| {
            v["field_rules"][0]["expression"] = json!({"op": "sum", "sources": []});
        });
        let err = EngineConfig::from_sources(empty).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySum(_)));

        let unknown = edited("deklar-aggregation.json", |v| {
            v["field_rules"][0]["expression"] = json!({
                "op": "subtract",
                "left": {"op": "sum", "sources": [{"table": "prodagbi", "field": "total_vat"}]},
                "right": {"op": "sum", "sources": [{"table": "pokupki", "field": "nope"}]}
            });
        });
        let err = EngineConfig::from_sources(unknown).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSourceField { ref field, .. } if field == "nope"));
    }

    #[test]
    fn test_trade_amount_field_is_configurable() {
        let sources = edited("vies-schema.json", |v| {
            v["aggregation"]["amount_field"] = json!("base_20");
        });
        let config = EngineConfig::from_sources(sources).unwrap();
        assert_eq!(config.trade.amount_field, "base_20");
        assert_eq!(config.trade.unidentified_counterparty_vat, "9999999999999");

        let absent = edited("vies-schema.json", |v| {
            if let Some(map) = v.as_object_mut() {
                map.remove("aggregation");
            }
        });
        let config = EngineConfig::from_sources(absent).unwrap();
        assert_eq!(config.trade.amount_field, "base_services_21_2");
    }

    #[test]
    fn test_trade_amount_field_must_be_numeric_sales_column() {
        let unknown = edited("vies-schema.json", |v| {
            v["aggregation"]["amount_field"] = json!("renamed_column");
        });
        let err = EngineConfig::from_sources(unknown).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTradeAmountField(ref f) if f == "renamed_column"));
        assert_eq!(err.error_code(), "UNKNOWN_TRADE_AMOUNT_FIELD");

        let text = edited("vies-schema.json", |v| {
            v["aggregation"]["amount_field"] = json!("counterparty_vat");
        });
        let err = EngineConfig::from_sources(text).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTradeAmountField(_)));
    }

    #[test]
    fn test_incomplete_ledger_columns() {
        let sources = edited("ledger-columns.json", |v| {
            if let Some(map) = v.as_object_mut() {
                map.remove("tax_tag_ids");
            }
        });
        let err = EngineConfig::from_sources(sources).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_LEDGER_MAPPING");
    }

    #[test]
    fn test_load_reads_directory() {
        let dir = std::env::temp_dir().join(format!("vattool-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for (name, text) in SHIPPED {
            fs::write(dir.join(name), text).unwrap();
        }
        fs::write(dir.join("README.txt"), "not a config").unwrap();

        let config = EngineConfig::load(&dir);
        fs::remove_dir_all(&dir).unwrap();

        assert!(config.is_ok());
    }

    #[test]
    fn test_load_missing_directory() {
        let err = EngineConfig::load(Path::new("/nonexistent/vattool/configs")).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_IO");
    }
}
