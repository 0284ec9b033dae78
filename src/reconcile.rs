//! Tenant reconciliation
//!
//! Walks a tenant's discovered schema and records, for each canonical field, which
//! physical column backs it and whether that mapping needs human review.

use crate::catalog::{canonical_fields, FieldDefinition};
use crate::discovery::{ColumnDef, SchemaDiscovery, TableInventory};
use crate::matcher::{match_field_to_column, MatchMethod, SynonymRegistry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Primary table candidates, most preferred first
const PRIMARY_TABLE_CANDIDATES: &[&str] =
    &["ASSETS", "ASSET", "GOLD_ASSETS", "TABLE_ENTITY", "ALL_ASSETS"];

const ARRAY_COLUMNS: &[&str] = &[
    "OWNER_USERS", "OWNERUSERS", "OWNER_GROUPS", "OWNERGROUPS", "TAGS", "CLASSIFICATIONNAMES",
    "TERM_GUIDS", "TERMGUIDS", "ADMIN_USERS", "ADMINUSERS", "ADMIN_GROUPS", "ADMINGROUPS",
    "DOMAIN_GUIDS", "DOMAINGUIDS",
];
const BOOLEAN_COLUMNS: &[&str] = &["HAS_LINEAGE", "HASLINEAGE", "__HASLINEAGE"];
const NUMERIC_COLUMNS: &[&str] = &[
    "POPULARITY_SCORE", "POPULARITYSCORE", "QUERY_COUNT", "QUERYCOUNT", "QUERY_USER_COUNT",
    "QUERYUSERCOUNT", "ASSET_POLICIES_COUNT", "ASSETPOLICIESCOUNT",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationStatus {
    Matched,
    AliasMatched,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingStatus {
    Auto,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub canonical_field_id: String,
    pub canonical_field_name: String,
    pub matched_column: Option<String>,
    pub reconciliation_status: ReconciliationStatus,
    pub status: MappingStatus,
    pub confidence: f64,
    pub method: MatchMethod,
    pub expected_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaReconciliation {
    pub database: String,
    pub schema: String,
    pub primary_table: Option<String>,
    pub tables: Vec<String>,
    /// Columns of the primary table
    pub columns: Vec<ColumnDef>,
    pub columns_by_table: BTreeMap<String, Vec<ColumnDef>>,
    /// Every column name seen in any table, sorted and de-duplicated
    pub native_attributes: Vec<String>,
    pub field_mappings: Vec<FieldMapping>,
    pub discovered_at: DateTime<Utc>,
}

impl SchemaReconciliation {
    pub fn count(&self, status: ReconciliationStatus) -> usize {
        self.field_mappings
            .iter()
            .filter(|m| m.reconciliation_status == status)
            .count()
    }
}

/// Table holding one row per asset, if the tenant has one
pub fn find_primary_table(tables: &TableInventory) -> Option<String> {
    PRIMARY_TABLE_CANDIDATES
        .iter()
        .find(|candidate| tables.contains(candidate))
        .map(|candidate| candidate.to_string())
        .or_else(|| tables.iter().find(|t| t.contains("ASSET")).map(str::to_string))
}

pub fn reconcile_fields(
    registry: &SynonymRegistry,
    catalog: &[FieldDefinition],
    columns: &[String],
) -> Vec<FieldMapping> {
    catalog
        .iter()
        .map(|field| {
            let result =
                match_field_to_column(registry, &field.id, columns, field.expected_column());
            let (reconciliation_status, status) = if !result.matched {
                (ReconciliationStatus::NotFound, MappingStatus::Pending)
            } else if result.method.is_exact() {
                (ReconciliationStatus::Matched, MappingStatus::Auto)
            } else {
                (ReconciliationStatus::AliasMatched, MappingStatus::Pending)
            };
            FieldMapping {
                canonical_field_id: field.id.clone(),
                canonical_field_name: field.display_name.clone(),
                matched_column: result.column,
                reconciliation_status,
                status,
                confidence: result.confidence,
                method: result.method,
                expected_columns: field.mdlh_columns.clone(),
            }
        })
        .collect()
}

/// Distinct column names across every table, sorted
pub fn native_attributes(columns_by_table: &BTreeMap<String, Vec<ColumnDef>>) -> Vec<String> {
    columns_by_table
        .values()
        .flatten()
        .map(|column| column.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Discover `database.schema`, describe every table, and map the canonical
/// catalog onto the primary table
pub async fn reconcile_schema(
    discovery: &SchemaDiscovery,
    registry: &SynonymRegistry,
    database: &str,
    schema: &str,
) -> SchemaReconciliation {
    info!("Reconciling canonical fields against {}.{}", database, schema);
    let inventory = discovery.discover_tables(database, schema).await;
    let primary_table = find_primary_table(&inventory);

    let mut columns_by_table = BTreeMap::new();
    for table in inventory.iter() {
        let columns = discovery.fetch_columns(database, schema, table).await;
        debug!("{} columns in {}", columns.len(), table);
        columns_by_table.insert(table.to_string(), columns);
    }

    let columns = match &primary_table {
        Some(table) => columns_by_table.get(table).cloned().unwrap_or_default(),
        None => {
            if !inventory.is_empty() {
                warn!(
                    "No asset table among {} tables in {}.{}",
                    inventory.len(),
                    database,
                    schema
                );
            }
            Vec::new()
        }
    };
    let column_names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let field_mappings = reconcile_fields(registry, canonical_fields(), &column_names);

    let reconciliation = SchemaReconciliation {
        database: database.to_string(),
        schema: schema.to_string(),
        primary_table,
        tables: inventory.iter().map(str::to_string).collect(),
        columns,
        native_attributes: native_attributes(&columns_by_table),
        columns_by_table,
        field_mappings,
        discovered_at: Utc::now(),
    };
    info!(
        "Reconciled {}.{}: {} matched, {} alias matched, {} not found",
        database,
        schema,
        reconciliation.count(ReconciliationStatus::Matched),
        reconciliation.count(ReconciliationStatus::AliasMatched),
        reconciliation.count(ReconciliationStatus::NotFound)
    );
    reconciliation
}

/// Double-quote a Snowflake identifier, dropping any quotes already present
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.trim().trim_matches('"').replace('"', "\"\""))
}

fn coverage_expression(field_id: &str, column: &str) -> String {
    let upper = column.to_uppercase();
    let col = quote_identifier(column);
    let predicate = if ARRAY_COLUMNS.contains(&upper.as_str()) {
        format!("{col} IS NOT NULL AND ARRAY_SIZE({col}) > 0")
    } else if BOOLEAN_COLUMNS.contains(&upper.as_str()) {
        format!("{col} = TRUE")
    } else if NUMERIC_COLUMNS.contains(&upper.as_str()) {
        format!("{col} IS NOT NULL")
    } else {
        format!("{col} IS NOT NULL AND CAST({col} AS VARCHAR) <> ''")
    };
    format!("COUNT_IF({}) AS {}", predicate, quote_identifier(field_id))
}

/// Population counts for every matched field over active rows; `None` when nothing matched
pub fn build_coverage_query(table_fqn: &str, mappings: &[FieldMapping]) -> Option<String> {
    let expressions: Vec<String> = mappings
        .iter()
        .filter_map(|m| {
            m.matched_column
                .as_deref()
                .map(|column| coverage_expression(&m.canonical_field_id, column))
        })
        .collect();
    if expressions.is_empty() {
        return None;
    }
    Some(format!(
        "SELECT\n    COUNT(*) AS total_count,\n    {}\nFROM {}\nWHERE STATUS = 'ACTIVE'",
        expressions.join(",\n    "),
        table_fqn
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_field;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_primary_table_preference() {
        assert_eq!(
            find_primary_table(&TableInventory::new(["TABLE_ENTITY", "GOLD_ASSETS"])),
            Some("GOLD_ASSETS".to_string())
        );
        assert_eq!(
            find_primary_table(&TableInventory::new(["TAGS", "RELATIONAL_ASSET_DETAILS"])),
            Some("RELATIONAL_ASSET_DETAILS".to_string())
        );
        assert_eq!(find_primary_table(&TableInventory::new(["TAGS"])), None);
    }

    #[test]
    fn test_reconcile_statuses() {
        let registry = SynonymRegistry::with_defaults();
        let catalog: Vec<FieldDefinition> = ["guid", "owner_users", "certificate_status"]
            .iter()
            .filter_map(|id| find_field(id).cloned())
            .collect();
        let mappings = reconcile_fields(&registry, &catalog, &cols(&["GUID", "OWNERS_LIST"]));

        assert_eq!(mappings[0].reconciliation_status, ReconciliationStatus::Matched);
        assert_eq!(mappings[0].status, MappingStatus::Auto);
        assert_eq!(mappings[1].reconciliation_status, ReconciliationStatus::AliasMatched);
        assert_eq!(mappings[1].status, MappingStatus::Pending);
        assert_eq!(mappings[2].reconciliation_status, ReconciliationStatus::NotFound);
        assert_eq!(mappings[2].matched_column, None);
    }

    #[test]
    fn test_native_attributes_span_all_tables() {
        let columns_by_table: BTreeMap<String, Vec<ColumnDef>> = [
            ("ASSETS", vec!["GUID", "OWNER", "ASSET_NAME"]),
            ("TAGS", vec!["TAG_NAME", "GUID"]),
            ("EMPTY", vec![]),
        ]
        .into_iter()
        .map(|(table, names)| {
            (table.to_string(), names.into_iter().map(ColumnDef::named).collect())
        })
        .collect();
        assert_eq!(
            native_attributes(&columns_by_table),
            vec!["ASSET_NAME", "GUID", "OWNER", "TAG_NAME"]
        );
        assert!(native_attributes(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("OWNER_USERS"), "\"OWNER_USERS\"");
        assert_eq!(quote_identifier("\"TAGS\""), "\"TAGS\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_coverage_query() {
        let registry = SynonymRegistry::with_defaults();
        let catalog: Vec<FieldDefinition> =
            ["owner_users", "has_lineage", "popularity_score", "description"]
                .iter()
                .filter_map(|id| find_field(id).cloned())
                .collect();
        let columns = cols(&["OWNER_USERS", "HAS_LINEAGE", "POPULARITY_SCORE", "DESCRIPTION"]);
        let mappings = reconcile_fields(&registry, &catalog, &columns);
        let sql = build_coverage_query("DB.PUBLIC.ASSETS", &mappings).unwrap();

        assert!(sql.contains(
            "COUNT_IF(\"OWNER_USERS\" IS NOT NULL AND ARRAY_SIZE(\"OWNER_USERS\") > 0) \
             AS \"owner_users\""
        ));
        assert!(sql.contains("COUNT_IF(\"HAS_LINEAGE\" = TRUE) AS \"has_lineage\""));
        assert!(sql.contains("COUNT_IF(\"POPULARITY_SCORE\" IS NOT NULL) AS \"popularity_score\""));
        assert!(sql.contains("CAST(\"DESCRIPTION\" AS VARCHAR) <> ''"));
        assert!(sql.ends_with("FROM DB.PUBLIC.ASSETS\nWHERE STATUS = 'ACTIVE'"));

        assert_eq!(build_coverage_query("DB.PUBLIC.ASSETS", &[]), None);
    }
}
