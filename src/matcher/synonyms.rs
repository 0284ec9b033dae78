//! Synonym Registry
//!
//! Known physical-name variants per logical field. A registry is an explicit
//! value: callers own it (or clone it per session), and every match consults it
//! live, so synonyms added through `add_field_synonyms` affect the very next
//! match on the same instance.

use crate::catalog::{FieldDefinition, CANONICAL_FIELDS, EXTRA_SYNONYMS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynonymRegistry {
    /// field id (lowercase) -> uppercase variants in registration order
    entries: BTreeMap<String, Vec<String>>,
}

impl SynonymRegistry {
    /// Empty registry with no synonyms
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry seeded from the canonical catalog plus known customer variants
    pub fn with_defaults() -> Self {
        let mut registry = Self::from_catalog(&CANONICAL_FIELDS);
        for (field_id, synonyms) in EXTRA_SYNONYMS.iter() {
            registry.add_field_synonyms(field_id, synonyms.as_slice());
        }
        registry
    }

    pub fn from_catalog(catalog: &[FieldDefinition]) -> Self {
        let mut registry = Self::empty();
        for field in catalog {
            registry.add_field_synonyms(&field.id, field.mdlh_columns.as_slice());
        }
        registry
    }

    /// Register additional synonyms for a field. Duplicates (ignoring case) are
    /// skipped; new variants are appended after existing ones.
    pub fn add_field_synonyms<S: AsRef<str>>(&mut self, field_id: &str, synonyms: &[S]) {
        let key = field_id.trim().to_lowercase();
        let entry = self.entries.entry(key).or_default();
        for synonym in synonyms {
            let upper = synonym.as_ref().trim().to_uppercase();
            if upper.is_empty() || entry.contains(&upper) {
                continue;
            }
            entry.push(upper);
        }
        debug!("Registered synonyms for '{}': {:?}", field_id, entry);
    }

    pub fn synonyms(&self, field_id: &str) -> &[String] {
        self.entries
            .get(&field_id.trim().to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_field(&self, field_id: &str) -> bool {
        self.entries.contains_key(&field_id.trim().to_lowercase())
    }

    /// Fields in stable (sorted) order with their synonyms
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
