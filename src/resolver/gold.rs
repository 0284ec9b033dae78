//! Gold layer table resolution
//!
//! Gold queries are authored against `GOLD.<TABLE>` but tenants expose the layer
//! under their own schema, sometimes with the table renamed.

use crate::discovery::TableInventory;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use tracing::{debug, warn};

pub const GOLD_SCHEMA: &str = "GOLD";

/// Tables the Gold layer is known to ship
pub const KNOWN_GOLD_TABLES: &[&str] = &[
    "ASSETS",
    "FULL_LINEAGE",
    "RELATIONAL_ASSET_DETAILS",
    "GLOSSARY_DETAILS",
    "DATA_QUALITY_DETAILS",
    "TAGS",
    "CUSTOM_METADATA",
    "README",
    "PIPELINE_DETAILS",
    "BI_ASSET_DETAILS",
    "DATA_MESH_DETAILS",
];

lazy_static! {
    /// Canonical Gold reference -> alternate physical names, tried in order
    pub static ref GOLD_TABLE_ALTERNATES: HashMap<&'static str, Vec<&'static str>> = {
        let mut m = HashMap::new();
        m.insert("GOLD.ASSETS", vec!["ASSET", "GOLD_ASSETS", "ALL_ASSETS"]);
        m.insert("GOLD.FULL_LINEAGE", vec!["LINEAGE", "GOLD_LINEAGE", "ASSET_LINEAGE"]);
        m.insert(
            "GOLD.RELATIONAL_ASSET_DETAILS",
            vec!["RELATIONAL_ASSETS", "GOLD_RELATIONAL_ASSET_DETAILS"],
        );
        m.insert(
            "GOLD.GLOSSARY_DETAILS",
            vec!["GLOSSARY", "GOLD_GLOSSARY_DETAILS", "GLOSSARY_TERMS"],
        );
        m.insert("GOLD.DATA_QUALITY_DETAILS", vec!["DATA_QUALITY", "DQ_DETAILS"]);
        m.insert("GOLD.TAGS", vec!["TAG", "ASSET_TAGS", "GOLD_TAGS"]);
        m.insert("GOLD.CUSTOM_METADATA", vec!["CUSTOM_METADATA_DETAILS", "GOLD_CUSTOM_METADATA"]);
        m.insert("GOLD.README", vec!["READMES", "ASSET_README"]);
        m.insert("GOLD.PIPELINE_DETAILS", vec!["PIPELINES", "PROCESS_DETAILS"]);
        m.insert("GOLD.BI_ASSET_DETAILS", vec!["BI_ASSETS", "GOLD_BI_ASSET_DETAILS"]);
        m.insert("GOLD.DATA_MESH_DETAILS", vec!["DATA_MESH", "DATA_PRODUCTS"]);
        m
    };

    // The leading group stands in for a lookbehind: a GOLD token that is
    // already qualified (DB.GOLD.X) is left alone.
    static ref GOLD_TOKEN: Regex = Regex::new(r"(?i)(^|[^\w.])GOLD\.(\w+)").unwrap();
}

pub fn is_known_gold_table(name: &str) -> bool {
    let upper = name.trim().to_uppercase();
    KNOWN_GOLD_TABLES.contains(&upper.as_str())
}

fn bare_table_name(gold_ref: &str) -> String {
    let upper = gold_ref.trim().replace('"', "").to_uppercase();
    match upper.strip_prefix("GOLD.") {
        Some(bare) => bare.to_string(),
        None => upper,
    }
}

/// Resolve a canonical `GOLD.<TABLE>` reference against the discovered inventory.
///
/// Returns `DATABASE.SCHEMA.TABLE` for the first candidate that exists, or `None`.
pub fn resolve_gold_table(
    gold_ref: &str,
    database: &str,
    schema: &str,
    inventory: &TableInventory,
) -> Option<String> {
    let bare = bare_table_name(gold_ref);
    if bare.is_empty() {
        return None;
    }
    let schema = schema.trim().to_uppercase();
    let fqn = |schema: &str, table: &str| format!("{}.{}.{}", database, schema, table);

    if inventory.contains(&format!("{}.{}", schema, bare)) || inventory.contains(&bare) {
        return Some(fqn(&schema, &bare));
    }

    let canonical = format!("{}.{}", GOLD_SCHEMA, bare);
    if let Some(alternates) = GOLD_TABLE_ALTERNATES.get(canonical.as_str()) {
        for alternate in alternates {
            if inventory.contains(alternate)
                || inventory.contains(&format!("{}.{}", schema, alternate))
            {
                debug!("Resolved {} via alternate {}", canonical, alternate);
                return Some(fqn(&schema, alternate));
            }
        }
    }

    if schema != GOLD_SCHEMA && inventory.contains(&canonical) {
        return Some(fqn(GOLD_SCHEMA, &bare));
    }

    None
}

/// Rewrite every unqualified `GOLD.<TABLE>` token in `sql`.
///
/// With no inventory yet, tokens are rewritten optimistically to the current
/// schema. With an inventory, unresolvable tokens are left untouched for the
/// validator to report.
pub fn resolve_gold_tables_in_sql(
    sql: &str,
    database: &str,
    schema: &str,
    inventory: &TableInventory,
) -> String {
    GOLD_TOKEN
        .replace_all(sql, |caps: &Captures| {
            let lead = &caps[1];
            let table = caps[2].to_uppercase();

            if inventory.is_empty() {
                return format!("{}{}.{}.{}", lead, database, schema, table);
            }
            match resolve_gold_table(&table, database, schema, inventory) {
                Some(fqn) => format!("{}{}", lead, fqn),
                None => {
                    warn!("Gold table GOLD.{} not found in {}.{}", table, database, schema);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_bare_name_in_current_schema() {
        let inventory = TableInventory::new(["ASSETS"]);
        assert_eq!(
            resolve_gold_table("GOLD.ASSETS", "DB", "PUBLIC", &inventory),
            Some("DB.PUBLIC.ASSETS".to_string())
        );
    }

    #[test]
    fn test_resolves_alternate_names() {
        let inventory = TableInventory::new(["GOLD_ASSETS", "LINEAGE"]);
        assert_eq!(
            resolve_gold_table("GOLD.ASSETS", "DB", "PUBLIC", &inventory),
            Some("DB.PUBLIC.GOLD_ASSETS".to_string())
        );
        assert_eq!(
            resolve_gold_table("gold.full_lineage", "DB", "PUBLIC", &inventory),
            Some("DB.PUBLIC.LINEAGE".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_literal_gold_schema() {
        let inventory = TableInventory::new(["GOLD.TAGS"]);
        assert_eq!(
            resolve_gold_table("GOLD.TAGS", "DB", "PUBLIC", &inventory),
            Some("DB.GOLD.TAGS".to_string())
        );
    }

    #[test]
    fn test_unknown_table_is_none() {
        let inventory = TableInventory::new(["TABLE_ENTITY"]);
        assert_eq!(resolve_gold_table("GOLD.ASSETS", "DB", "PUBLIC", &inventory), None);
        assert_eq!(
            resolve_gold_table("GOLD.ASSETS", "DB", "PUBLIC", &TableInventory::default()),
            None
        );
    }

    #[test]
    fn test_sql_rewrite() {
        let inventory = TableInventory::new(["ASSETS"]);
        assert_eq!(
            resolve_gold_tables_in_sql("SELECT * FROM GOLD.ASSETS", "DB", "PUBLIC", &inventory),
            "SELECT * FROM DB.PUBLIC.ASSETS"
        );
    }

    #[test]
    fn test_sql_rewrite_is_optimistic_without_inventory() {
        let sql = "SELECT a.GUID FROM GOLD.ASSETS a JOIN GOLD.TAGS t ON t.ASSET_GUID = a.GUID";
        assert_eq!(
            resolve_gold_tables_in_sql(sql, "DB", "PUBLIC", &TableInventory::default()),
            "SELECT a.GUID FROM DB.PUBLIC.ASSETS a JOIN DB.PUBLIC.TAGS t ON t.ASSET_GUID = a.GUID"
        );
    }

    #[test]
    fn test_sql_rewrite_leaves_unresolved_and_qualified_tokens() {
        let inventory = TableInventory::new(["ASSETS"]);
        let sql = "SELECT * FROM GOLD.FULL_LINEAGE JOIN OTHER.GOLD.ASSETS";
        assert_eq!(resolve_gold_tables_in_sql(sql, "DB", "PUBLIC", &inventory), sql);
    }

    #[test]
    fn test_known_gold_tables() {
        assert!(is_known_gold_table("assets"));
        assert!(!is_known_gold_table("TABLE_ENTITY"));
    }
}
