//! Context/Profile Resolver
//!
//! Picks table and column defaults from the capabilities descriptor published by
//! the connection layer, and translates legacy entity SQL for Gold tenants.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Profile {
    AtlanGold,
    FieldMetadata,
    Unknown,
}

impl Profile {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_uppercase().as_str() {
            "ATLAN_GOLD" => Profile::AtlanGold,
            "FIELD_METADATA" => Profile::FieldMetadata,
            _ => Profile::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::AtlanGold => "ATLAN_GOLD",
            Profile::FieldMetadata => "FIELD_METADATA",
            Profile::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub name: String,
}

/// What the connected tenant exposes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub tables: Vec<String>,
    #[serde(default)]
    pub columns: HashMap<String, Vec<ColumnRef>>,
}

impl Capabilities {
    fn has_table(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    fn columns_for(&self, table: &str) -> Option<&[ColumnRef]> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(table))
            .map(|(_, columns)| columns.as_slice())
    }
}

pub fn resolve_profile(capabilities: Option<&Capabilities>) -> Profile {
    capabilities.map_or(Profile::Unknown, |c| Profile::from_tag(&c.profile))
}

/// `ASSETS` for Gold, `TABLE_ENTITY` for field metadata, else the first known table
pub fn resolve_preferred_table_name(capabilities: Option<&Capabilities>, fallback: &str) -> String {
    let Some(caps) = capabilities else {
        return fallback.to_string();
    };
    let preferred = match resolve_profile(capabilities) {
        Profile::AtlanGold => Some("ASSETS"),
        Profile::FieldMetadata => Some("TABLE_ENTITY"),
        Profile::Unknown => None,
    };
    if let Some(table) = preferred.filter(|t| caps.has_table(t)) {
        return table.to_string();
    }
    caps.tables
        .first()
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

pub fn resolve_table_fqn(
    capabilities: Option<&Capabilities>,
    database: &str,
    schema: &str,
    fallback: &str,
) -> String {
    format!(
        "{}.{}.{}",
        database,
        schema,
        resolve_preferred_table_name(capabilities, fallback)
    )
}

/// Column names published for `table`, or the fallback list when none are
pub fn resolve_available_columns(
    capabilities: Option<&Capabilities>,
    table: &str,
    fallback_columns: &[String],
) -> Vec<String> {
    match capabilities.and_then(|c| c.columns_for(table)) {
        Some(columns) if !columns.is_empty() => columns.iter().map(|c| c.name.clone()).collect(),
        _ => fallback_columns.to_vec(),
    }
}

lazy_static! {
    /// Legacy entity identifiers and their Gold equivalents
    static ref GOLD_IDENTIFIERS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        // tables
        m.insert("TABLE_ENTITY", "ASSETS");
        m.insert("VIEW_ENTITY", "ASSETS");
        m.insert("COLUMN_ENTITY", "RELATIONAL_ASSET_DETAILS");
        m.insert("PROCESS_ENTITY", "FULL_LINEAGE");
        m.insert("ATLASGLOSSARYTERM_ENTITY", "GLOSSARY_DETAILS");
        m.insert("TAG_RELATIONSHIP", "TAGS");
        // columns
        m.insert("NAME", "ASSET_NAME");
        m.insert("TYPENAME", "ASSET_TYPE");
        m.insert("QUALIFIEDNAME", "ASSET_QUALIFIED_NAME");
        m.insert("USERDESCRIPTION", "DESCRIPTION");
        m.insert("OWNERUSERS", "OWNER_USERS");
        m.insert("OWNERGROUPS", "OWNER_GROUPS");
        m.insert("CLASSIFICATIONNAMES", "TAGS");
        m.insert("CERTIFICATESTATUS", "CERTIFICATE_STATUS");
        m.insert("POPULARITYSCORE", "POPULARITY_SCORE");
        m.insert("HASLINEAGE", "HAS_LINEAGE");
        m.insert("__HASLINEAGE", "HAS_LINEAGE");
        m.insert("CONNECTORNAME", "CONNECTOR_NAME");
        m.insert("CREATETIME", "CREATED_AT");
        m.insert("UPDATETIME", "UPDATED_AT");
        m
    };

    static ref GOLD_IDENTIFIER_PATTERN: Regex = {
        let mut keys: Vec<&str> = GOLD_IDENTIFIERS.keys().copied().collect();
        // longest first so __HASLINEAGE wins over HASLINEAGE
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        Regex::new(&format!(r"(?i)\b(?:{})\b", keys.join("|"))).unwrap()
    };
}

/// Translate legacy entity identifiers to Gold names in a single pass.
///
/// Matches whole identifiers only, so quoted identifiers are translated and
/// partial names such as `NAME_SUFFIX` are not.
pub fn map_sql_for_gold(sql: &str) -> String {
    GOLD_IDENTIFIER_PATTERN
        .replace_all(sql, |caps: &Captures| {
            let matched = &caps[0];
            GOLD_IDENTIFIERS
                .get(matched.to_uppercase().as_str())
                .map(|gold| gold.to_string())
                .unwrap_or_else(|| matched.to_string())
        })
        .into_owned()
}

/// Apply the Gold translation only when the tenant runs the Gold profile
pub fn map_sql_for_capabilities(sql: &str, capabilities: Option<&Capabilities>) -> String {
    match resolve_profile(capabilities) {
        Profile::AtlanGold => {
            debug!("Mapping SQL for Gold profile");
            map_sql_for_gold(sql)
        }
        _ => sql.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(profile: &str, tables: &[&str]) -> Capabilities {
        Capabilities {
            profile: profile.to_string(),
            tables: tables.iter().map(|t| t.to_string()).collect(),
            columns: HashMap::new(),
        }
    }

    #[test]
    fn test_resolve_profile() {
        assert_eq!(resolve_profile(Some(&caps("ATLAN_GOLD", &[]))), Profile::AtlanGold);
        assert_eq!(resolve_profile(Some(&caps("field_metadata", &[]))), Profile::FieldMetadata);
        assert_eq!(resolve_profile(Some(&caps("custom", &[]))), Profile::Unknown);
        assert_eq!(resolve_profile(None), Profile::Unknown);
    }

    #[test]
    fn test_preferred_table() {
        let gold = caps("ATLAN_GOLD", &["TAGS", "ASSETS"]);
        assert_eq!(resolve_preferred_table_name(Some(&gold), "X"), "ASSETS");

        let legacy = caps("FIELD_METADATA", &["COLUMN_ENTITY", "TABLE_ENTITY"]);
        assert_eq!(resolve_preferred_table_name(Some(&legacy), "X"), "TABLE_ENTITY");

        let gold_without_assets = caps("ATLAN_GOLD", &["TAGS"]);
        assert_eq!(resolve_preferred_table_name(Some(&gold_without_assets), "X"), "TAGS");

        assert_eq!(resolve_preferred_table_name(Some(&caps("", &[])), "X"), "X");
        assert_eq!(resolve_table_fqn(None, "DB", "PUBLIC", "ASSETS"), "DB.PUBLIC.ASSETS");
    }

    #[test]
    fn test_available_columns() {
        let mut capabilities = caps("ATLAN_GOLD", &["ASSETS"]);
        capabilities.columns.insert(
            "ASSETS".to_string(),
            vec![
                ColumnRef { name: "GUID".to_string() },
                ColumnRef { name: "ASSET_NAME".to_string() },
            ],
        );
        let fallback = vec!["NAME".to_string()];
        assert_eq!(
            resolve_available_columns(Some(&capabilities), "assets", &fallback),
            vec!["GUID", "ASSET_NAME"]
        );
        assert_eq!(resolve_available_columns(Some(&capabilities), "TAGS", &fallback), fallback);
    }

    #[test]
    fn test_map_sql_for_gold() {
        let sql =
            r#"SELECT NAME, "TYPENAME", t.__hasLineage, NAME_SUFFIX FROM DB.PUBLIC.TABLE_ENTITY t"#;
        assert_eq!(
            map_sql_for_gold(sql),
            r#"SELECT ASSET_NAME, "ASSET_TYPE", t.HAS_LINEAGE, NAME_SUFFIX FROM DB.PUBLIC.ASSETS t"#
        );
    }

    #[test]
    fn test_mapping_only_applies_to_gold() {
        let sql = "SELECT NAME FROM TABLE_ENTITY";
        assert_eq!(map_sql_for_capabilities(sql, Some(&caps("FIELD_METADATA", &[]))), sql);
        assert_eq!(map_sql_for_capabilities(sql, None), sql);
        assert_eq!(
            map_sql_for_capabilities(sql, Some(&caps("ATLAN_GOLD", &[]))),
            "SELECT ASSET_NAME FROM ASSETS"
        );
    }

    #[test]
    fn test_capabilities_deserialize() {
        let raw = r#"{
            "profile": "ATLAN_GOLD",
            "tables": ["ASSETS"],
            "columns": {"ASSETS": [{"name": "GUID"}]}
        }"#;
        let parsed: Capabilities = serde_json::from_str(raw).unwrap();
        assert_eq!(resolve_profile(Some(&parsed)), Profile::AtlanGold);
        assert_eq!(parsed.columns["ASSETS"][0].name, "GUID");
    }
}
