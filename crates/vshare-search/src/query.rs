//! Compilation of structured search requests into index queries.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use vshare_models::VideoId;

/// Queries at or below this trimmed length compile to a recall-first
/// disjunctive match; word segmentation is unreliable for them.
const SHORT_QUERY_MAX_CHARS: usize = 2;

/// Sort mode for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Score descending, then publish time descending
    #[default]
    Relevance,
    /// Publish time descending
    Latest,
    /// Hot score descending
    Hot,
}

/// A structured search request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    /// Free-text query; None or blank means filter-only browsing
    pub query: Option<String>,
    pub author_id: Option<i64>,
    pub video_id: Option<VideoId>,
    /// Inclusive publish_time lower bound (epoch seconds)
    pub published_after: Option<i64>,
    /// Inclusive publish_time upper bound (epoch seconds)
    pub published_before: Option<i64>,
    #[serde(default)]
    pub sort: SortMode,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

impl SearchRequest {
    pub fn trimmed_query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Compile a request into an Elasticsearch query body.
///
/// `page` and `page_size` must already be clamped by the caller.
pub fn build_search_query(request: &SearchRequest, page: u32, page_size: u32) -> Value {
    let mut bool_query = serde_json::Map::new();

    // Non-scoring filters; published-only always holds.
    let mut filters = vec![json!({ "term": { "status": "published" } })];
    if let Some(author_id) = request.author_id {
        filters.push(json!({ "term": { "author_id": author_id } }));
    }
    if let Some(video_id) = request.video_id {
        filters.push(json!({ "term": { "id": video_id } }));
    }
    if request.published_after.is_some() || request.published_before.is_some() {
        let mut range = serde_json::Map::new();
        if let Some(after) = request.published_after {
            range.insert("gte".to_string(), json!(after));
        }
        if let Some(before) = request.published_before {
            range.insert("lte".to_string(), json!(before));
        }
        filters.push(json!({ "range": { "publish_time": range } }));
    }
    bool_query.insert("filter".to_string(), json!(filters));

    if let Some(q) = request.trimmed_query() {
        let multi_match = json!({
            "multi_match": {
                "query": q,
                "fields": ["title^3", "description"]
            }
        });
        if q.chars().count() <= SHORT_QUERY_MAX_CHARS {
            // Recall-first: any field may match.
            bool_query.insert("should".to_string(), json!([multi_match]));
            bool_query.insert("minimum_should_match".to_string(), json!(1));
        } else {
            // Precision-first: at least half the terms must match.
            let mut conjunctive = multi_match;
            conjunctive["multi_match"]["minimum_should_match"] = json!("50%");
            conjunctive["multi_match"]["operator"] = json!("or");
            bool_query.insert("must".to_string(), json!([conjunctive]));
        }
    }

    let sort = match request.sort {
        SortMode::Latest => json!([{ "publish_time": { "order": "desc" } }]),
        SortMode::Hot => json!([{ "hot_score": { "order": "desc" } }]),
        SortMode::Relevance => json!([
            { "_score": { "order": "desc" } },
            { "publish_time": { "order": "desc" } }
        ]),
    };

    let mut body = json!({
        "from": (page - 1) * page_size,
        "size": page_size,
        "_source": ["id"],
        "query": { "bool": Value::Object(bool_query) },
        "sort": sort
    });

    if request.trimmed_query().is_some() {
        body["highlight"] = json!({
            "pre_tags": ["<em>"],
            "post_tags": ["</em>"],
            "fields": {
                "title": {},
                "description": {}
            }
        });
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(q: &str) -> SearchRequest {
        SearchRequest {
            query: Some(q.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_short_query_is_disjunctive() {
        let body = build_search_query(&request("猫"), 1, 20);
        let bool_q = &body["query"]["bool"];

        assert!(bool_q["should"].is_array());
        assert_eq!(bool_q["minimum_should_match"], json!(1));
        assert!(bool_q["must"].is_null());
        assert_eq!(
            bool_q["should"][0]["multi_match"]["fields"],
            json!(["title^3", "description"])
        );
    }

    #[test]
    fn test_boundary_two_chars_still_disjunctive() {
        let body = build_search_query(&request("ab"), 1, 20);
        assert!(body["query"]["bool"]["should"].is_array());
    }

    #[test]
    fn test_long_query_is_conjunctive() {
        let body = build_search_query(&request("cooking tutorial"), 1, 20);
        let bool_q = &body["query"]["bool"];

        assert!(bool_q["must"].is_array());
        assert!(bool_q["should"].is_null());
        assert_eq!(
            bool_q["must"][0]["multi_match"]["minimum_should_match"],
            json!("50%")
        );
    }

    #[test]
    fn test_published_filter_always_present() {
        let body = build_search_query(&SearchRequest::default(), 1, 20);
        let filters = body["query"]["bool"]["filter"].as_array().unwrap();
        assert!(filters.contains(&json!({ "term": { "status": "published" } })));
    }

    #[test]
    fn test_optional_filters() {
        let req = SearchRequest {
            author_id: Some(42),
            video_id: Some(VideoId(7)),
            published_after: Some(1000),
            published_before: Some(2000),
            ..Default::default()
        };
        let body = build_search_query(&req, 1, 20);
        let filters = body["query"]["bool"]["filter"].as_array().unwrap();

        assert!(filters.contains(&json!({ "term": { "author_id": 42 } })));
        assert!(filters.contains(&json!({ "term": { "id": 7 } })));
        assert!(filters
            .contains(&json!({ "range": { "publish_time": { "gte": 1000, "lte": 2000 } } })));
    }

    #[test]
    fn test_sort_modes() {
        let mut req = request("hello world");
        req.sort = SortMode::Latest;
        let body = build_search_query(&req, 1, 20);
        assert_eq!(body["sort"], json!([{ "publish_time": { "order": "desc" } }]));

        req.sort = SortMode::Hot;
        let body = build_search_query(&req, 1, 20);
        assert_eq!(body["sort"], json!([{ "hot_score": { "order": "desc" } }]));

        req.sort = SortMode::Relevance;
        let body = build_search_query(&req, 1, 20);
        assert_eq!(body["sort"][0], json!({ "_score": { "order": "desc" } }));
        assert_eq!(body["sort"][1], json!({ "publish_time": { "order": "desc" } }));
    }

    #[test]
    fn test_highlight_only_with_query() {
        let body = build_search_query(&request("hello"), 1, 20);
        assert_eq!(body["highlight"]["pre_tags"], json!(["<em>"]));
        assert!(body["highlight"]["fields"]["title"].is_object());

        let body = build_search_query(&SearchRequest::default(), 1, 20);
        assert!(body["highlight"].is_null());
    }

    #[test]
    fn test_pagination_offsets() {
        let body = build_search_query(&SearchRequest::default(), 3, 10);
        assert_eq!(body["from"], json!(20));
        assert_eq!(body["size"], json!(10));
        assert_eq!(body["_source"], json!(["id"]));
    }

    #[test]
    fn test_blank_query_means_no_text_clause() {
        let body = build_search_query(&request("   "), 1, 20);
        let bool_q = &body["query"]["bool"];
        assert!(bool_q["must"].is_null());
        assert!(bool_q["should"].is_null());
    }
}
