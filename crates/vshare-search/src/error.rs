//! Search error types.

use thiserror::Error;

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur against the search index.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid Elasticsearch URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build transport: {0}")]
    TransportBuild(#[from] elasticsearch::http::transport::BuildError),

    #[error("transport error: {0}")]
    Transport(#[from] elasticsearch::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("index request rejected: {0}")]
    Rejected(String),

    #[error("database error: {0}")]
    Db(#[from] vshare_db::DbError),
}

impl SearchError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}
