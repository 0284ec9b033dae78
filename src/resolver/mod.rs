//! Table Name Resolver
//!
//! Maps canonical table references onto the tables discovery actually found,
//! for both the Gold layer (`GOLD.<TABLE>`) and the legacy entity layer.

pub mod gold;
pub mod legacy;

pub use gold::{
    is_known_gold_table, resolve_gold_table, resolve_gold_tables_in_sql, GOLD_SCHEMA,
    GOLD_TABLE_ALTERNATES, KNOWN_GOLD_TABLES,
};
pub use legacy::{find_actual_table_name, LEGACY_TABLE_PATTERNS};
