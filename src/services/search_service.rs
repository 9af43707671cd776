use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::dto::user_dto::{UserResponse, UserSearchHit};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search index returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed search response: {0}")]
    Malformed(String),
}

/// Indexed projection of a user. The document id is the user id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDocument {
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&UserResponse> for UserDocument {
    fn from(user: &UserResponse) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn upsert(&self, id: i32, document: &UserDocument) -> Result<(), SearchError>;
    /// Removing an absent document succeeds.
    async fn delete(&self, id: i32) -> Result<(), SearchError>;
    /// Relevance-ranked matches on name and email.
    async fn search(&self, query: &str) -> Result<Vec<UserSearchHit>, SearchError>;
    async fn cluster_status(&self) -> Result<String, SearchError>;
}

/// Polls cluster health until it answers or attempts run out. Returns whether the
/// index became reachable; callers continue either way.
pub async fn wait_for_search_index(index: &dyn SearchIndex, attempts: u32, delay: Duration) -> bool {
    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        match index.cluster_status().await {
            Ok(status) => {
                tracing::info!(status = %status, "Elasticsearch connection successful");
                return true;
            }
            Err(e) if attempt < attempts => {
                tracing::warn!(attempt, error = %e, "Elasticsearch not reachable yet, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                tracing::error!(
                    attempts,
                    error = %e,
                    "Elasticsearch unreachable, continuing without search"
                );
            }
        }
    }
    false
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: UserDocument,
}

#[derive(Debug, Deserialize)]
struct ClusterHealth {
    status: String,
}

fn search_body(query: &str) -> JsonValue {
    json!({
        "query": {
            "multi_match": {
                "query": query,
                "fields": ["name", "email"]
            }
        }
    })
}

fn into_hits(response: SearchResponse) -> Result<Vec<UserSearchHit>, SearchError> {
    response
        .hits
        .hits
        .into_iter()
        .map(|hit| {
            let id = hit
                .id
                .parse::<i32>()
                .map_err(|e| SearchError::Malformed(format!("document id {:?}: {}", hit.id, e)))?;
            Ok(UserSearchHit {
                id,
                name: hit.source.name,
                email: hit.source.email,
                created_at: hit.source.created_at,
            })
        })
        .collect()
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SearchError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(SearchError::Status { status, body })
}

#[derive(Clone)]
pub struct ElasticsearchIndex {
    client: Client,
    base_url: String,
    index: String,
}

impl ElasticsearchIndex {
    pub fn new(client: Client, base_url: impl Into<String>, index: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            index: index.into(),
        }
    }

    fn doc_url(&self, id: i32) -> String {
        format!("{}/{}/_doc/{}", self.base_url, self.index, id)
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn upsert(&self, id: i32, document: &UserDocument) -> Result<(), SearchError> {
        let response = self.client.put(self.doc_url(id)).json(document).send().await?;
        ensure_success(response).await?;
        tracing::info!(user_id = id, "Indexed user in Elasticsearch");
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), SearchError> {
        let response = self.client.delete(self.doc_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(user_id = id, "Index document already absent");
            return Ok(());
        }
        ensure_success(response).await?;
        tracing::info!(user_id = id, "Deleted user from Elasticsearch");
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<UserSearchHit>, SearchError> {
        let url = format!("{}/{}/_search", self.base_url, self.index);
        let response = self
            .client
            .post(&url)
            .json(&search_body(query))
            .send()
            .await?;
        let parsed = ensure_success(response)
            .await?
            .json::<SearchResponse>()
            .await?;
        let hits = into_hits(parsed)?;
        tracing::info!(query, count = hits.len(), "Search completed");
        Ok(hits)
    }

    async fn cluster_status(&self) -> Result<String, SearchError> {
        let url = format!("{}/_cluster/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        let health = ensure_success(response)
            .await?
            .json::<ClusterHealth>()
            .await?;
        Ok(health.status)
    }
}
