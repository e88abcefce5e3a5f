//! Elasticsearch index client.

use elasticsearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, DeleteParts, Elasticsearch, IndexParts, SearchParts,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use vshare_models::VideoId;

use crate::document::VideoDocument;
use crate::error::{SearchError, SearchResult};
use crate::query::{build_search_query, SearchRequest};

/// Index configuration.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub url: String,
    pub index_name: String,
}

impl IndexConfig {
    pub fn from_env() -> SearchResult<Self> {
        Ok(Self {
            url: std::env::var("ELASTICSEARCH_URL")
                .unwrap_or_else(|_| "http://localhost:9200".to_string()),
            index_name: std::env::var("ELASTICSEARCH_VIDEO_INDEX")
                .unwrap_or_else(|_| "videos".to_string()),
        })
    }
}

/// One hit from the index, with optional highlight fragments.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: VideoId,
    pub title_highlight: Option<String>,
    pub description_highlight: Option<String>,
}

/// Outcome of an index query: ordered ids plus the total match count.
#[derive(Debug, Clone)]
pub struct IndexSearchOutcome {
    pub hits: Vec<SearchHit>,
    pub total: i64,
}

/// Outcome of a bulk write, counted per document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

/// Long-lived index client. Clone freely.
#[derive(Clone)]
pub struct SearchIndex {
    client: Elasticsearch,
    index_name: String,
}

impl SearchIndex {
    pub fn new(config: &IndexConfig) -> SearchResult<Self> {
        let parsed = Url::parse(&config.url)?;
        let pool = SingleNodeConnectionPool::new(parsed);
        let transport = TransportBuilder::new(pool).build()?;

        Ok(Self {
            client: Elasticsearch::new(transport),
            index_name: config.index_name.clone(),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Create the video index with its mapping if it does not exist.
    pub async fn ensure_index(&self) -> SearchResult<()> {
        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[self.index_name.as_str()]))
            .send()
            .await?;

        if exists.status_code().is_success() {
            return Ok(());
        }

        let body = json!({
            "mappings": {
                "properties": {
                    "id": { "type": "long" },
                    "author_id": { "type": "long" },
                    "author_name": { "type": "keyword" },
                    "title": { "type": "text" },
                    "description": { "type": "text" },
                    "status": { "type": "keyword" },
                    "publish_time": { "type": "long" },
                    "view_count": { "type": "long" },
                    "favorite_count": { "type": "long" },
                    "comment_count": { "type": "long" },
                    "hot_score": { "type": "double" },
                    "duration": { "type": "integer" },
                    "created_at": { "type": "long" },
                    "updated_at": { "type": "long" }
                }
            }
        });

        self.client
            .indices()
            .create(IndicesCreateParts::Index(&self.index_name))
            .body(body)
            .send()
            .await?;

        info!("Created search index {}", self.index_name);
        Ok(())
    }

    /// Upsert one document, keyed by video id.
    pub async fn index_video(&self, doc: &VideoDocument) -> SearchResult<()> {
        let response = self
            .client
            .index(IndexParts::IndexId(
                &self.index_name,
                doc.id.to_string().as_str(),
            ))
            .body(doc)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(SearchError::rejected(format!(
                "index request for video {} returned {}",
                doc.id,
                response.status_code()
            )));
        }

        debug!("Indexed video {}", doc.id);
        Ok(())
    }

    /// Remove one document; missing documents are not an error.
    pub async fn delete_video(&self, id: VideoId) -> SearchResult<()> {
        self.client
            .delete(DeleteParts::IndexId(
                &self.index_name,
                id.to_string().as_str(),
            ))
            .send()
            .await?;
        Ok(())
    }

    /// Bulk-upsert documents, counting per-item outcomes. A partial
    /// failure never fails the whole batch.
    pub async fn bulk_index(&self, docs: &[VideoDocument]) -> SearchResult<BulkOutcome> {
        if docs.is_empty() {
            return Ok(BulkOutcome::default());
        }

        let mut body_lines = Vec::with_capacity(docs.len() * 2);
        for doc in docs {
            let action = json!({ "index": { "_index": &self.index_name, "_id": doc.id.to_string() } });
            body_lines.push(serde_json::to_string(&action)?);
            body_lines.push(serde_json::to_string(doc)?);
        }

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(body_lines)
            .send()
            .await?;

        let result: Value = response.json().await?;
        let mut outcome = BulkOutcome::default();
        for item in result["items"].as_array().map(Vec::as_slice).unwrap_or(&[]) {
            let status = item["index"]["status"].as_i64().unwrap_or(0);
            if (200..300).contains(&status) {
                outcome.succeeded += 1;
            } else {
                outcome.failed += 1;
                warn!(
                    "Bulk index item failed (status {}): {}",
                    status, item["index"]["error"]
                );
            }
        }

        Ok(outcome)
    }

    /// Execute a compiled query and return ordered hits plus the total.
    pub async fn search(
        &self,
        request: &SearchRequest,
        page: u32,
        page_size: u32,
    ) -> SearchResult<IndexSearchOutcome> {
        let body = build_search_query(request, page, page_size);

        let response = self
            .client
            .search(SearchParts::Index(&[self.index_name.as_str()]))
            .body(body)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(SearchError::rejected(format!(
                "search returned {}",
                response.status_code()
            )));
        }

        let parsed: EsSearchResponse = response.json().await?;
        let hits = parsed
            .hits
            .hits
            .into_iter()
            .filter_map(|hit| {
                let id = hit.source.map(|s| s.id)?;
                let highlight = hit.highlight.unwrap_or_default();
                Some(SearchHit {
                    id,
                    title_highlight: highlight.title.and_then(|f| f.into_iter().next()),
                    description_highlight: highlight
                        .description
                        .and_then(|f| f.into_iter().next()),
                })
            })
            .collect();

        Ok(IndexSearchOutcome {
            hits,
            total: parsed.hits.total.value,
        })
    }

    /// Ping the cluster.
    pub async fn health_check(&self) -> SearchResult<()> {
        let response = self.client.ping().send().await?;
        if response.status_code().is_success() {
            Ok(())
        } else {
            Err(SearchError::rejected(format!(
                "ping returned {}",
                response.status_code()
            )))
        }
    }
}

#[derive(Debug, Deserialize)]
struct EsSearchResponse {
    hits: EsHits,
}

#[derive(Debug, Deserialize)]
struct EsHits {
    total: EsTotal,
    hits: Vec<EsHit>,
}

#[derive(Debug, Deserialize)]
struct EsTotal {
    value: i64,
}

#[derive(Debug, Deserialize)]
struct EsHit {
    #[serde(rename = "_source")]
    source: Option<EsSource>,
    highlight: Option<EsHighlight>,
}

#[derive(Debug, Deserialize)]
struct EsSource {
    id: VideoId,
}

#[derive(Debug, Deserialize, Default)]
struct EsHighlight {
    title: Option<Vec<String>>,
    description: Option<Vec<String>>,
}
