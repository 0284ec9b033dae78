pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod matcher;
pub mod profile;
pub mod reconcile;
pub mod resolver;
pub mod validator;

pub use catalog::{canonical_fields, find_field, FieldCategory, FieldDefinition};
pub use config::{CacheSettings, ReconcilerConfig};
pub use discovery::{
    CacheStats, ColumnDef, MetadataApiClient, MetadataSource, SchemaDiscovery, TableInventory,
};
pub use error::{ReconcileError, Result};
pub use matcher::{
    calculate_similarity, identify_column, infer_column_category, match_catalog_to_columns,
    match_field_to_column, normalize_column_name, ColumnMatchResult, MatchMethod, SynonymRegistry,
};
pub use profile::{Capabilities, Profile};
pub use reconcile::{reconcile_schema, FieldMapping, SchemaReconciliation};
pub use validator::{QueryValidationResult, SqlIssues};
