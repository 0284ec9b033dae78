//! Metadata API client
//!
//! `GET {base}/metadata/tables` and `GET {base}/metadata/columns`, authenticated
//! with the `X-Session-ID` header obtained from a session store.

use crate::config::ReconcilerConfig;
use crate::error::{ReconcileError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const SESSION_HEADER: &str = "X-Session-ID";

/// Table listing entry; the API returns either plain names or descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableEntry {
    Name(String),
    Descriptor(TableDescriptor),
}

impl TableEntry {
    pub fn name(&self) -> &str {
        match self {
            TableEntry::Name(name) => name,
            TableEntry::Descriptor(descriptor) => &descriptor.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub row_count: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ColumnDef {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: None,
            nullable: None,
            comment: None,
        }
    }
}

/// Source of live schema metadata
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn list_tables(
        &self,
        database: &str,
        schema: &str,
        refresh: bool,
    ) -> Result<Vec<TableEntry>>;

    async fn list_columns(
        &self,
        database: &str,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDef>>;
}

/// Supplies the session token the metadata API expects
pub trait SessionStore: Send + Sync {
    fn session_id(&self) -> Option<String>;
}

/// Session store holding a fixed token (or none)
#[derive(Debug, Clone, Default)]
pub struct StaticSession(pub Option<String>);

impl SessionStore for StaticSession {
    fn session_id(&self) -> Option<String> {
        self.0.clone()
    }
}

pub struct MetadataApiClient {
    http: reqwest::Client,
    base_url: String,
    sessions: Arc<dyn SessionStore>,
}

impl MetadataApiClient {
    pub fn new(base_url: &str, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            sessions,
        }
    }

    pub fn from_config(config: &ReconcilerConfig, sessions: Arc<dyn SessionStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ReconcileError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            sessions,
        })
    }

    fn session_id(&self) -> Result<String> {
        self.sessions
            .session_id()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ReconcileError::Auth("No active session; connect before discovery".to_string())
            })
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let session = self.session_id()?;
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .query(query)
            .header(SESSION_HEADER, session)
            .send()
            .await
            .map_err(|e| ReconcileError::Transport(format!("Metadata API call failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ReconcileError::Auth(format!("Metadata API rejected session ({})", status)));
        }
        if !status.is_success() {
            return Err(ReconcileError::Transport(format!(
                "Metadata API returned {} for {}",
                status, path
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| {
                ReconcileError::Metadata(format!("Failed to parse metadata response: {}", e))
            })
    }
}

#[async_trait]
impl MetadataSource for MetadataApiClient {
    async fn list_tables(
        &self,
        database: &str,
        schema: &str,
        refresh: bool,
    ) -> Result<Vec<TableEntry>> {
        let refresh = if refresh { "true" } else { "false" };
        self.get_json(
            "/metadata/tables",
            &[("database", database), ("schema", schema), ("refresh", refresh)],
        )
        .await
    }

    async fn list_columns(
        &self,
        database: &str,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDef>> {
        self.get_json(
            "/metadata/columns",
            &[("database", database), ("schema", schema), ("table", table)],
        )
        .await
    }
}
