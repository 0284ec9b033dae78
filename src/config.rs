//! Runtime configuration
//!
//! Values come from the environment (a `.env` file is loaded by the binary
//! before this runs). Every setting has a default except the session id.

use crate::error::{ReconcileError, Result};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_DATABASE: &str = "ATLAN_MDLH";
pub const DEFAULT_SCHEMA: &str = "PUBLIC";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheSettings {
    pub table_ttl: Duration,
    pub column_ttl: Duration,
    pub max_table_keys: usize,
    pub max_column_keys: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            table_ttl: Duration::from_secs(300),  // 5 minutes
            column_ttl: Duration::from_secs(600), // 10 minutes
            max_table_keys: 5000,
            max_column_keys: 10000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilerConfig {
    pub api_base_url: String,
    pub session_id: Option<String>,
    pub database: String,
    pub schema: String,
    pub cache: CacheSettings,
    pub request_timeout: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_id: None,
            database: DEFAULT_DATABASE.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            cache: CacheSettings::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ReconcilerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, falling back to defaults for unset keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let cache = CacheSettings {
            table_ttl: parse_seconds(
                get("CACHE_TTL_TABLES"),
                "CACHE_TTL_TABLES",
                defaults.cache.table_ttl,
            )?,
            column_ttl: parse_seconds(
                get("CACHE_TTL_COLUMNS"),
                "CACHE_TTL_COLUMNS",
                defaults.cache.column_ttl,
            )?,
            max_table_keys: parse_count(
                get("CACHE_MAX_TABLE_KEYS"),
                "CACHE_MAX_TABLE_KEYS",
                defaults.cache.max_table_keys,
            )?,
            max_column_keys: parse_count(
                get("CACHE_MAX_COLUMN_KEYS"),
                "CACHE_MAX_COLUMN_KEYS",
                defaults.cache.max_column_keys,
            )?,
        };

        Ok(Self {
            api_base_url: get("MDLH_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            session_id: get("MDLH_SESSION_ID"),
            database: get("MDLH_DATABASE").unwrap_or(defaults.database),
            schema: get("MDLH_SCHEMA").unwrap_or(defaults.schema),
            cache,
            request_timeout: parse_seconds(
                get("METADATA_TIMEOUT_SECONDS"),
                "METADATA_TIMEOUT_SECONDS",
                defaults.request_timeout,
            )?,
        })
    }
}

fn parse_seconds(value: Option<String>, key: &str, default: Duration) -> Result<Duration> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ReconcileError::Config(format!(
                    "{} must be whole seconds, got '{}': {}",
                    key, raw, e
                ))
            }),
    }
}

fn parse_count(value: Option<String>, key: &str, default: usize) -> Result<usize> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.parse::<usize>() {
            Ok(0) => Err(ReconcileError::Config(format!("{} must be greater than zero", key))),
            Ok(n) => Ok(n),
            Err(e) => Err(ReconcileError::Config(format!(
                "{} must be a positive integer, got '{}': {}",
                key, raw, e
            ))),
        },
    }
}
