//! Rewrite table references onto discovered physical names

use super::{ensure_no_placeholders, resolve_reference};
use crate::discovery::TableInventory;
use crate::error::Result;
use crate::resolver::{is_known_gold_table, resolve_gold_tables_in_sql};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Qualifier left behind by the retired field-metadata share
pub const DEPRECATED_PREFIX: &str = "FIELD_METADATA.PUBLIC.";

lazy_static! {
    static ref CLAUSE_TABLE: Regex =
        Regex::new(r#"(?i)\b(FROM|JOIN|INTO|UPDATE)(\s+)([A-Za-z_"][\w."$]*)"#).unwrap();
    static ref GOLD_LEFTOVER: Regex = Regex::new(r"(?i)(^|[^\w.])GOLD\.(\w+)\b(\.?)").unwrap();
}

/// Physical name to emit for a resolved reference, or `None` to keep it as written.
///
/// A dotted inventory entry is kept only when it is the reference itself or its
/// `SCHEMA.TABLE` tail; any other dotted entry is qualified with the database.
fn qualified_name(reference: &str, actual: &str, database: &str, schema: &str) -> Option<String> {
    if !actual.contains('.') {
        return Some(format!("{}.{}.{}", database, schema, actual));
    }
    let segments: Vec<&str> = reference.split('.').collect();
    let tail = segments[segments.len().saturating_sub(2)..].join(".");
    if actual == reference || actual == tail {
        None
    } else {
        Some(format!("{}.{}", database, actual))
    }
}

fn push_missing(missing_tables: &mut Vec<String>, reference: String) {
    if !missing_tables.contains(&reference) {
        missing_tables.push(reference);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub sql: String,
    pub valid: bool,
    pub missing_tables: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_tables_discovered: bool,
}

/// Point every FROM/JOIN/INTO/UPDATE reference at `database.schema.<actual>`.
///
/// The deprecated share prefix is swapped for the current location first, then
/// Gold tokens are resolved. Allowlisted `GOLD.X` tokens in any other position get
/// the same treatment. References that cannot be resolved are left untouched and
/// listed in `missing_tables`. Without an inventory the query is returned with only
/// the prefix rewrite applied.
pub fn transform_query_to_discovered_tables(
    sql: &str,
    database: &str,
    schema: &str,
    inventory: &TableInventory,
) -> Result<TransformResult> {
    ensure_no_placeholders(sql)?;

    let sql = sql.replace(DEPRECATED_PREFIX, &format!("{}.{}.", database, schema));

    if inventory.is_empty() {
        return Ok(TransformResult {
            sql,
            valid: true,
            missing_tables: Vec::new(),
            no_tables_discovered: true,
        });
    }

    let sql = resolve_gold_tables_in_sql(&sql, database, schema, inventory);

    let mut missing_tables: Vec<String> = Vec::new();
    let rewritten = CLAUSE_TABLE
        .replace_all(&sql, |caps: &Captures| {
            let reference = caps[3].replace('"', "").trim_end_matches('.').to_uppercase();
            if reference == "LATERAL" || reference.contains("INFORMATION_SCHEMA") {
                return caps[0].to_string();
            }
            match resolve_reference(&reference, inventory) {
                Some(actual) => match qualified_name(&reference, &actual, database, schema) {
                    Some(name) => format!("{}{}{}", &caps[1], &caps[2], name),
                    None => caps[0].to_string(),
                },
                None => {
                    push_missing(&mut missing_tables, reference);
                    caps[0].to_string()
                }
            }
        })
        .into_owned();

    // Gold tokens outside clause position (comma joins, subquery lists)
    let rewritten = GOLD_LEFTOVER
        .replace_all(&rewritten, |caps: &Captures| {
            let table = caps[2].to_uppercase();
            if !caps[3].is_empty() || !is_known_gold_table(&table) {
                return caps[0].to_string();
            }
            let reference = format!("GOLD.{}", table);
            match resolve_reference(&reference, inventory) {
                Some(actual) => match qualified_name(&reference, &actual, database, schema) {
                    Some(name) => format!("{}{}", &caps[1], name),
                    None => caps[0].to_string(),
                },
                None => {
                    push_missing(&mut missing_tables, reference);
                    caps[0].to_string()
                }
            }
        })
        .into_owned();

    if missing_tables.is_empty() {
        info!("Rewrote query onto {}.{}", database, schema);
    } else {
        warn!(
            "Query references tables not found in {}.{}: {:?}",
            database, schema, missing_tables
        );
    }

    Ok(TransformResult {
        sql: rewritten,
        valid: missing_tables.is_empty(),
        missing_tables,
        no_tables_discovered: false,
    })
}
