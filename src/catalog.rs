//! Canonical Field Catalog
//!
//! Connector-agnostic metadata fields and the physical column names each one is
//! known to appear under. The catalog seeds the default synonym registry and
//! drives tenant reconciliation.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category taxonomy for metadata fields and physical columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    Ownership,
    Documentation,
    Glossary,
    Classification,
    Governance,
    Lineage,
    Quality,
    Usage,
    Identity,
    Timestamp,
    Integration,
    Hierarchy,
    Lifecycle,
    Unknown,
}

impl FieldCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldCategory::Ownership => "ownership",
            FieldCategory::Documentation => "documentation",
            FieldCategory::Glossary => "glossary",
            FieldCategory::Classification => "classification",
            FieldCategory::Governance => "governance",
            FieldCategory::Lineage => "lineage",
            FieldCategory::Quality => "quality",
            FieldCategory::Usage => "usage",
            FieldCategory::Identity => "identity",
            FieldCategory::Timestamp => "timestamp",
            FieldCategory::Integration => "integration",
            FieldCategory::Hierarchy => "hierarchy",
            FieldCategory::Lifecycle => "lifecycle",
            FieldCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub category: FieldCategory,
    /// Physical column names in priority order; the first is the expected column
    pub mdlh_columns: Vec<String>,
}

impl FieldDefinition {
    pub fn new(
        id: &str,
        display_name: &str,
        description: &str,
        category: FieldCategory,
        mdlh_columns: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            category,
            mdlh_columns: mdlh_columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn expected_column(&self) -> Option<&str> {
        self.mdlh_columns.first().map(|c| c.as_str())
    }
}

lazy_static! {
    pub static ref CANONICAL_FIELDS: Vec<FieldDefinition> = {
        use FieldCategory::*;
        vec![
            FieldDefinition::new(
                "guid",
                "GUID",
                "Universal primary key for joins",
                Identity,
                &["GUID"],
            ),
            FieldDefinition::new(
                "asset_name",
                "Asset Name",
                "Name of the asset",
                Identity,
                &["ASSET_NAME", "NAME"],
            ),
            FieldDefinition::new(
                "asset_type",
                "Asset Type",
                "Type of asset (Table, View, Column, etc.)",
                Identity,
                &["ASSET_TYPE", "TYPE_NAME", "TYPENAME"],
            ),
            FieldDefinition::new(
                "asset_qualified_name",
                "Qualified Name",
                "Fully qualified name of the asset",
                Identity,
                &["ASSET_QUALIFIED_NAME", "QUALIFIED_NAME", "QUALIFIEDNAME"],
            ),
            FieldDefinition::new(
                "status",
                "Status",
                "Asset status (ACTIVE, DELETED, etc.)",
                Identity,
                &["STATUS"],
            ),
            FieldDefinition::new(
                "connector_name",
                "Connector Name",
                "Name of the data source connector",
                Identity,
                &["CONNECTOR_NAME", "CONNECTORNAME"],
            ),
            FieldDefinition::new(
                "owner_users",
                "Owner Users",
                "Individual users accountable for the asset",
                Ownership,
                &["OWNER_USERS", "OWNERUSERS"],
            ),
            FieldDefinition::new(
                "owner_groups",
                "Owner Groups",
                "Teams or groups accountable for the asset",
                Ownership,
                &["OWNER_GROUPS", "OWNERGROUPS"],
            ),
            FieldDefinition::new(
                "admin_users",
                "Admin Users",
                "Users with admin rights on the asset",
                Ownership,
                &["ADMIN_USERS", "ADMINUSERS"],
            ),
            FieldDefinition::new(
                "admin_groups",
                "Admin Groups",
                "Groups with admin rights on the asset",
                Ownership,
                &["ADMIN_GROUPS", "ADMINGROUPS"],
            ),
            FieldDefinition::new(
                "description",
                "Description",
                "Short prose description of the asset",
                Documentation,
                &["DESCRIPTION", "USER_DESCRIPTION", "USERDESCRIPTION"],
            ),
            FieldDefinition::new(
                "readme_guid",
                "README GUID",
                "GUID of linked README documentation",
                Documentation,
                &["README_GUID", "READMEGUID", "README"],
            ),
            FieldDefinition::new(
                "term_guids",
                "Term GUIDs",
                "GUIDs of glossary terms linked to the asset",
                Glossary,
                &["TERM_GUIDS", "TERMGUIDS", "MEANINGS", "ASSIGNEDTERMS"],
            ),
            FieldDefinition::new(
                "tags",
                "Tags",
                "Tags assigned to the asset",
                Classification,
                &["TAGS", "CLASSIFICATIONNAMES", "CLASSIFICATION_NAMES"],
            ),
            FieldDefinition::new(
                "certificate_status",
                "Certificate Status",
                "Certification status of the asset",
                Governance,
                &["CERTIFICATE_STATUS", "CERTIFICATESTATUS"],
            ),
            FieldDefinition::new(
                "certificate_message",
                "Certificate Message",
                "Message attached to the certificate",
                Governance,
                &["CERTIFICATE_STATUS_MESSAGE", "CERTIFICATESTATUSMESSAGE"],
            ),
            FieldDefinition::new(
                "policy_count",
                "Policy Count",
                "Number of policies applied to the asset",
                Governance,
                &["ASSET_POLICIES_COUNT", "ASSETPOLICIESCOUNT"],
            ),
            FieldDefinition::new(
                "has_lineage",
                "Has Lineage",
                "Asset has upstream or downstream lineage",
                Lineage,
                &["HAS_LINEAGE", "HASLINEAGE", "__HASLINEAGE"],
            ),
            FieldDefinition::new(
                "is_primary_key",
                "Is Primary Key",
                "Column is part of a primary key",
                Lineage,
                &["IS_PRIMARY_KEY", "ISPRIMARYKEY"],
            ),
            FieldDefinition::new(
                "is_foreign_key",
                "Is Foreign Key",
                "Column is part of a foreign key",
                Lineage,
                &["IS_FOREIGN_KEY", "ISFOREIGNKEY"],
            ),
            FieldDefinition::new(
                "dq_soda_status",
                "Soda DQ Status",
                "Soda data quality check status",
                Quality,
                &["ASSET_SODA_DQ_STATUS", "ASSETSODADQSTATUS"],
            ),
            FieldDefinition::new(
                "mc_is_monitored",
                "Monte Carlo Monitored",
                "Asset is monitored by Monte Carlo",
                Quality,
                &["ASSET_MC_IS_MONITORED", "ASSETMCISMONITORED"],
            ),
            FieldDefinition::new(
                "popularity_score",
                "Popularity Score",
                "Usage popularity score",
                Usage,
                &["POPULARITY_SCORE", "POPULARITYSCORE"],
            ),
            FieldDefinition::new(
                "query_count",
                "Query Count",
                "Number of queries executed against this asset",
                Usage,
                &["QUERY_COUNT", "QUERYCOUNT"],
            ),
            FieldDefinition::new(
                "query_user_count",
                "Query User Count",
                "Number of unique users who queried this asset",
                Usage,
                &["QUERY_USER_COUNT", "QUERYUSERCOUNT"],
            ),
            FieldDefinition::new(
                "connection_qualified_name",
                "Connection Qualified Name",
                "Qualified name of the owning connection",
                Hierarchy,
                &["CONNECTION_QUALIFIED_NAME", "CONNECTIONQUALIFIEDNAME"],
            ),
            FieldDefinition::new(
                "database_qualified_name",
                "Database Qualified Name",
                "Qualified name of the owning database",
                Hierarchy,
                &["DATABASE_QUALIFIED_NAME", "DATABASEQUALIFIEDNAME"],
            ),
            FieldDefinition::new(
                "schema_qualified_name",
                "Schema Qualified Name",
                "Qualified name of the owning schema",
                Hierarchy,
                &["SCHEMA_QUALIFIED_NAME", "SCHEMAQUALIFIEDNAME"],
            ),
            FieldDefinition::new(
                "domain_guids",
                "Domain GUIDs",
                "GUIDs of data domains the asset belongs to",
                Hierarchy,
                &["DOMAIN_GUIDS", "DOMAINGUIDS", "__DOMAINGUIDS"],
            ),
            FieldDefinition::new(
                "created_at",
                "Created At",
                "Creation timestamp",
                Lifecycle,
                &["CREATE_TIME", "CREATETIME", "__TIMESTAMP"],
            ),
            FieldDefinition::new(
                "updated_at",
                "Updated At",
                "Last modification timestamp",
                Lifecycle,
                &["UPDATE_TIME", "UPDATETIME", "__MODIFICATIONTIMESTAMP"],
            ),
        ]
    };

    /// Variants seen in customer schemas that are not canonical MDLH columns
    pub static ref EXTRA_SYNONYMS: Vec<(&'static str, Vec<&'static str>)> = vec![
        ("owner_users", vec!["OWNER", "OWNERS", "OWNED_BY", "ASSET_OWNER"]),
        ("owner_groups", vec!["OWNER_GROUP", "OWNING_TEAM", "TEAM"]),
        ("description", vec!["DESC", "ASSET_DESCRIPTION", "COMMENT"]),
        ("certificate_status", vec!["CERT_STATUS", "CERTIFICATION", "CERTIFICATION_STATUS"]),
        ("tags", vec!["TAG_NAMES", "CLASSIFICATIONS", "LABELS"]),
        ("term_guids", vec!["GLOSSARY_TERMS", "TERMS"]),
        ("asset_name", vec!["TABLE_NAME", "OBJECT_NAME", "DISPLAY_NAME"]),
        ("asset_type", vec!["TYPE", "OBJECT_TYPE", "ENTITY_TYPE"]),
        ("has_lineage", vec!["LINEAGE_FLAG", "HAS_UPSTREAM"]),
        ("popularity_score", vec!["POPULARITY", "USAGE_SCORE"]),
        ("created_at", vec!["CREATED_AT", "CREATED_DATE", "CREATED"]),
        ("updated_at", vec!["UPDATED_AT", "MODIFIED_AT", "LAST_MODIFIED"]),
    ];
}

pub fn canonical_fields() -> &'static [FieldDefinition] {
    CANONICAL_FIELDS.as_slice()
}

pub fn find_field(field_id: &str) -> Option<&'static FieldDefinition> {
    CANONICAL_FIELDS
        .iter()
        .find(|f| f.id.eq_ignore_ascii_case(field_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_ids_are_unique() {
        let ids: HashSet<&str> = CANONICAL_FIELDS.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), CANONICAL_FIELDS.len());
    }

    #[test]
    fn test_every_field_has_expected_column() {
        for field in canonical_fields() {
            assert!(field.expected_column().is_some(), "{} has no columns", field.id);
        }
    }

    #[test]
    fn test_find_field_is_case_insensitive() {
        let field = find_field("OWNER_USERS").unwrap();
        assert_eq!(field.category, FieldCategory::Ownership);
        assert_eq!(field.expected_column(), Some("OWNER_USERS"));
    }
}
