//! Legacy entity-table resolution (`*_ENTITY` per-asset-type tables)

use crate::discovery::TableInventory;
use lazy_static::lazy_static;
use std::collections::HashMap;
use tracing::debug;

lazy_static! {
    /// Canonical entity table -> physical names seen across connectors and versions
    pub static ref LEGACY_TABLE_PATTERNS: HashMap<&'static str, Vec<&'static str>> = {
        let mut m = HashMap::new();
        m.insert(
            "TABLE_ENTITY",
            vec!["SNOWFLAKETABLE_ENTITY", "ATLAS_TABLE_ENTITY", "TABLES_ENTITY"],
        );
        m.insert(
            "COLUMN_ENTITY",
            vec!["SNOWFLAKECOLUMN_ENTITY", "ATLAS_COLUMN_ENTITY", "COLUMNS_ENTITY"],
        );
        m.insert("VIEW_ENTITY", vec!["SNOWFLAKEVIEW_ENTITY", "ATLAS_VIEW_ENTITY"]);
        m.insert("DATABASE_ENTITY", vec!["SNOWFLAKEDATABASE_ENTITY"]);
        m.insert("SCHEMA_ENTITY", vec!["SNOWFLAKESCHEMA_ENTITY"]);
        m.insert("PROCESS_ENTITY", vec!["LINEAGEPROCESS_ENTITY", "ATLAS_PROCESS_ENTITY"]);
        m.insert("COLUMNPROCESS_ENTITY", vec!["COLUMN_PROCESS_ENTITY"]);
        m.insert("ATLASGLOSSARY_ENTITY", vec!["GLOSSARY_ENTITY", "ATLAS_GLOSSARY_ENTITY"]);
        m.insert(
            "ATLASGLOSSARYTERM_ENTITY",
            vec!["GLOSSARYTERM_ENTITY", "GLOSSARY_TERM_ENTITY", "ATLAS_GLOSSARY_TERM_ENTITY"],
        );
        m.insert(
            "ATLASGLOSSARYCATEGORY_ENTITY",
            vec!["GLOSSARYCATEGORY_ENTITY", "GLOSSARY_CATEGORY_ENTITY"],
        );
        m.insert("DATAPRODUCT_ENTITY", vec!["DATA_PRODUCT_ENTITY"]);
        m.insert("DATADOMAIN_ENTITY", vec!["DATA_DOMAIN_ENTITY"]);
        m
    };
}

/// Find the physical table backing a canonical entity table name.
///
/// Only names present in `inventory` are returned; an empty inventory yields `None`.
pub fn find_actual_table_name(canonical: &str, inventory: &TableInventory) -> Option<String> {
    if inventory.is_empty() {
        return None;
    }
    let canonical = TableInventory::canonical(canonical);
    if canonical.is_empty() {
        return None;
    }

    if inventory.contains(&canonical) {
        return Some(canonical);
    }

    if let Some(alternates) = LEGACY_TABLE_PATTERNS.get(canonical.as_str()) {
        if let Some(found) = alternates.iter().find(|alt| inventory.contains(alt)) {
            debug!("Resolved {} via known alternate {}", canonical, found);
            return Some(found.to_string());
        }
    }

    let base = canonical.strip_suffix("_ENTITY").unwrap_or(&canonical);
    if base.is_empty() {
        return None;
    }
    inventory
        .iter()
        .find(|table| {
            table.contains(base) && (table.ends_with("_ENTITY") || table.starts_with("ATLAS"))
        })
        .map(|table| {
            debug!("Resolved {} by containment to {}", canonical, table);
            table.to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let inventory = TableInventory::new(["TABLE_ENTITY", "COLUMN_ENTITY"]);
        assert_eq!(
            find_actual_table_name("table_entity", &inventory),
            Some("TABLE_ENTITY".to_string())
        );
    }

    #[test]
    fn test_known_alternate() {
        let inventory = TableInventory::new(["SNOWFLAKETABLE_ENTITY"]);
        assert_eq!(
            find_actual_table_name("TABLE_ENTITY", &inventory),
            Some("SNOWFLAKETABLE_ENTITY".to_string())
        );
    }

    #[test]
    fn test_containment_heuristic() {
        let inventory = TableInventory::new(["ASSETS", "TABLEAUWORKBOOK_ENTITY"]);
        assert_eq!(
            find_actual_table_name("WORKBOOK_ENTITY", &inventory),
            Some("TABLEAUWORKBOOK_ENTITY".to_string())
        );
        // contains the base but is neither an entity nor an ATLAS table
        let inventory = TableInventory::new(["WORKBOOK_STAGING"]);
        assert_eq!(find_actual_table_name("WORKBOOK_ENTITY", &inventory), None);
    }

    #[test]
    fn test_never_returns_unverified_name() {
        assert_eq!(find_actual_table_name("TABLE_ENTITY", &TableInventory::default()), None);
        let inventory = TableInventory::new(["ASSETS"]);
        assert_eq!(find_actual_table_name("TABLE_ENTITY", &inventory), None);
    }
}
