use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Query contains unresolved placeholders: {}", .0.join(", "))]
    UnresolvedPlaceholders(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ReconcileError {
    fn from(e: reqwest::Error) -> Self {
        ReconcileError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
