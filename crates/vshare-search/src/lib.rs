//! Elasticsearch-backed video search.
//!
//! This crate provides:
//! - The indexed document shape and the hot-score function
//! - A query compiler for structured search requests
//! - The search service, which hydrates hits from Postgres and falls
//!   back to it when the index is unreachable
//! - Index sync (single upsert and full rebuild)

pub mod document;
pub mod error;
pub mod index;
pub mod query;
pub mod service;
pub mod sync;

pub use document::{hot_score, VideoDocument};
pub use error::{SearchError, SearchResult};
pub use index::{BulkOutcome, IndexConfig, IndexSearchOutcome, SearchHit, SearchIndex};
pub use query::{build_search_query, SearchRequest, SortMode};
pub use service::{SearchResultItem, SearchService};
pub use sync::IndexSync;
