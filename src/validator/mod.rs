//! Query Validator & Rewriter
//!
//! Checks that every table a query references exists in the discovered inventory,
//! rewrites references onto discovered physical names, and filters canned example
//! queries down to the ones the connected tenant can run.

pub mod extract;
pub mod issues;
pub mod rewrite;

pub use extract::{extract_all_referenced_tables, find_placeholders};
pub use issues::{apply_column_alternates, find_sql_issues, ColumnAlternate, SqlIssues};
pub use rewrite::{transform_query_to_discovered_tables, TransformResult, DEPRECATED_PREFIX};

use crate::discovery::TableInventory;
use crate::error::{ReconcileError, Result};
use crate::resolver::find_actual_table_name;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryValidationResult {
    pub valid: bool,
    pub missing_tables: Vec<String>,
    pub found_tables: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_tables_discovered: bool,
}

/// Fail on unresolved template placeholders
pub(crate) fn ensure_no_placeholders(sql: &str) -> Result<()> {
    let placeholders = find_placeholders(sql);
    if placeholders.is_empty() {
        Ok(())
    } else {
        Err(ReconcileError::UnresolvedPlaceholders(placeholders))
    }
}

/// Gold references match `X`, `GOLD_X`, `GOLD.X`, `PUBLIC.X`, or any table ending in `X`
fn find_gold_table(table: &str, inventory: &TableInventory) -> Option<String> {
    let candidates = [
        table.to_string(),
        format!("GOLD_{}", table),
        format!("GOLD.{}", table),
        format!("PUBLIC.{}", table),
    ];
    if let Some(found) = candidates.into_iter().find(|name| inventory.contains(name)) {
        return Some(found);
    }
    inventory
        .iter()
        .find(|entry| entry.ends_with(table))
        .map(|entry| entry.to_string())
}

fn last_segment(reference: &str) -> &str {
    reference.rsplit('.').next().unwrap_or(reference)
}

/// Resolve one extracted reference against the inventory.
///
/// A schema-qualified reference whose `SCHEMA.TABLE` tail is itself in the
/// inventory resolves to that tail.
pub(crate) fn resolve_reference(reference: &str, inventory: &TableInventory) -> Option<String> {
    if let Some(table) = reference.strip_prefix("GOLD.").filter(|t| !t.contains('.')) {
        return find_gold_table(table, inventory);
    }
    let segments: Vec<&str> = reference.split('.').collect();
    if segments.len() >= 2 {
        let tail = segments[segments.len() - 2..].join(".");
        if inventory.contains(&tail) {
            return Some(tail);
        }
    }
    find_actual_table_name(last_segment(reference), inventory)
}

/// Check every referenced table against the inventory.
///
/// Placeholders are rejected regardless of inventory state. With nothing
/// discovered yet the query is passed through as valid.
pub fn validate_query_tables(
    sql: &str,
    inventory: &TableInventory,
) -> Result<QueryValidationResult> {
    ensure_no_placeholders(sql)?;

    if inventory.is_empty() {
        return Ok(QueryValidationResult {
            valid: true,
            no_tables_discovered: true,
            ..Default::default()
        });
    }

    let mut result = QueryValidationResult::default();
    for reference in extract_all_referenced_tables(sql) {
        match resolve_reference(&reference, inventory) {
            Some(actual) => {
                debug!("Table {} -> {}", reference, actual);
                if !result.found_tables.contains(&actual) {
                    result.found_tables.push(actual);
                }
            }
            None => result.missing_tables.push(reference),
        }
    }
    result.valid = result.missing_tables.is_empty();
    Ok(result)
}

/// A canned query shown in the query library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleQuery {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub sql: String,
}

/// Keep only the queries whose tables all exist; everything passes before discovery
pub fn filter_queries_by_availability(
    queries: &[ExampleQuery],
    inventory: &TableInventory,
) -> Vec<ExampleQuery> {
    if inventory.is_empty() {
        return queries.to_vec();
    }
    queries
        .iter()
        .filter(|query| match validate_query_tables(&query.sql, inventory) {
            Ok(result) => result.valid,
            Err(e) => {
                debug!("Dropping query '{}': {}", query.name, e);
                false
            }
        })
        .cloned()
        .collect()
}
