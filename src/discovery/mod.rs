//! Schema Inventory / Discovery Cache
//!
//! Answers "what tables and columns actually exist" for a `database.schema`,
//! backed by the metadata API and a TTL'd LRU cache per key.
//!
//! Failure never escapes this module: a transport or auth error is logged and the
//! caller receives an empty inventory. An empty inventory is never trusted as a
//! final answer either; the next call for the same key fetches again.
//!
//! Concurrent misses on the same key are not coalesced, so two callers racing on
//! a cold key both hit the API.

pub mod cache;
pub mod client;

pub use cache::TtlLruCache;
pub use client::{
    ColumnDef, MetadataApiClient, MetadataSource, SessionStore, StaticSession, TableDescriptor,
    TableEntry,
};

use crate::config::CacheSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Canonical (uppercased) table names known to exist in one `database.schema`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInventory {
    tables: BTreeSet<String>,
}

impl TableInventory {
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tables.into_iter().collect()
    }

    pub fn canonical(name: &str) -> String {
        name.trim().replace('"', "").to_uppercase()
    }

    pub fn insert(&mut self, name: &str) {
        let canonical = Self::canonical(name);
        if !canonical.is_empty() {
            self.tables.insert(canonical);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains(&Self::canonical(name))
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.as_str())
    }
}

impl<S: AsRef<str>> FromIterator<S> for TableInventory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut inventory = TableInventory::default();
        for name in iter {
            inventory.insert(name.as_ref());
        }
        inventory
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub table_entries: usize,
    pub column_entries: usize,
}

fn table_key(database: &str, schema: &str) -> String {
    format!("{}.{}", database.trim(), schema.trim()).to_uppercase()
}

fn column_key(database: &str, schema: &str, table: &str) -> String {
    format!("{}.{}", table_key(database, schema), table.trim().to_uppercase())
}

pub struct SchemaDiscovery {
    source: Arc<dyn MetadataSource>,
    tables: Mutex<TtlLruCache<String, TableInventory>>,
    columns: Mutex<TtlLruCache<String, Vec<ColumnDef>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SchemaDiscovery {
    pub fn new(source: Arc<dyn MetadataSource>, settings: &CacheSettings) -> Self {
        Self {
            source,
            tables: Mutex::new(TtlLruCache::new(settings.max_table_keys, settings.table_ttl)),
            columns: Mutex::new(TtlLruCache::new(settings.max_column_keys, settings.column_ttl)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn table_cache(&self) -> MutexGuard<'_, TtlLruCache<String, TableInventory>> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn column_cache(&self) -> MutexGuard<'_, TtlLruCache<String, Vec<ColumnDef>>> {
        self.columns.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Tables that exist in `database.schema`; empty when discovery failed
    pub async fn discover_tables(&self, database: &str, schema: &str) -> TableInventory {
        let key = table_key(database, schema);
        let cached = self.table_cache().get(&key);

        let refresh = match cached {
            Some(inventory) if !inventory.is_empty() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Table cache hit for {} ({} tables)", key, inventory.len());
                return inventory;
            }
            // previously empty: ask the API to bypass its own cache too
            Some(_) => true,
            None => false,
        };
        self.misses.fetch_add(1, Ordering::Relaxed);

        match self.source.list_tables(database, schema, refresh).await {
            Ok(entries) => {
                let inventory: TableInventory = entries.iter().map(|e| e.name()).collect();
                info!("Discovered {} tables in {}", inventory.len(), key);
                self.table_cache().insert(key, inventory.clone());
                inventory
            }
            Err(e) => {
                warn!("Table discovery failed for {}: {}", key, e);
                TableInventory::default()
            }
        }
    }

    /// Columns of `database.schema.table`; empty when discovery failed
    pub async fn fetch_columns(&self, database: &str, schema: &str, table: &str) -> Vec<ColumnDef> {
        let key = column_key(database, schema, table);
        let cached = self.column_cache().get(&key);

        if let Some(columns) = cached {
            if !columns.is_empty() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return columns;
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        match self.source.list_columns(database, schema, table).await {
            Ok(columns) => {
                info!("Discovered {} columns in {}", columns.len(), key);
                self.column_cache().insert(key, columns.clone());
                columns
            }
            Err(e) => {
                warn!("Column discovery failed for {}: {}", key, e);
                Vec::new()
            }
        }
    }

    /// Column names only, in API order
    pub async fn fetch_column_names(
        &self,
        database: &str,
        schema: &str,
        table: &str,
    ) -> Vec<String> {
        self.fetch_columns(database, schema, table)
            .await
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    /// Drop every cached table and column inventory
    pub fn clear_discovery_cache(&self) {
        self.table_cache().clear();
        self.column_cache().clear();
        info!("Discovery cache cleared");
    }

    pub fn invalidate_tables(&self, database: &str, schema: &str) {
        self.table_cache().remove(&table_key(database, schema));
    }

    pub fn invalidate_columns(&self, database: &str, schema: &str, table: &str) {
        self.column_cache().remove(&column_key(database, schema, table));
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            table_entries: self.table_cache().len(),
            column_entries: self.column_cache().len(),
        }
    }
}
