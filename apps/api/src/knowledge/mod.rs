//! Company knowledge lookup for the assistant's `get_company_info` tool.
//!
//! Default: `StaticKnowledgeBase`, keyword-ranked chunks of the built-in
//! company profile. With `KNOWLEDGE_SEARCH_URL` set, `HttpKnowledgeBase`
//! delegates to an external vector search service.
//!
//! `AppState` holds an `Arc<dyn CompanyKnowledge>`, chosen at startup.

pub mod splitter;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::chat::prompts::COMPANY_PROFILE;
use splitter::{split_text, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

#[async_trait]
pub trait CompanyKnowledge: Send + Sync {
    /// Up to `top_k` passages relevant to `query`, best first.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<String>>;

    /// Replaces the stored company description. Returns the number of chunks indexed.
    async fn replace_description(&self, description: &str) -> Result<usize>;
}

fn chunk_description(description: &str) -> Vec<String> {
    split_text(description, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
}

// ────────────────────────────────────────────────────────────────────────────
// StaticKnowledgeBase
// ────────────────────────────────────────────────────────────────────────────

/// In-process knowledge base ranked by query-word overlap.
pub struct StaticKnowledgeBase {
    chunks: RwLock<Vec<String>>,
}

impl StaticKnowledgeBase {
    pub fn new(description: &str) -> Self {
        Self {
            chunks: RwLock::new(chunk_description(description)),
        }
    }

    /// Seeded with the built-in company profile.
    pub fn with_company_profile() -> Self {
        Self::new(COMPANY_PROFILE)
    }
}

#[async_trait]
impl CompanyKnowledge for StaticKnowledgeBase {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        let chunks = self.chunks.read().await;
        Ok(rank_chunks(&chunks, query, top_k))
    }

    async fn replace_description(&self, description: &str) -> Result<usize> {
        let chunks = chunk_description(description);
        let count = chunks.len();
        *self.chunks.write().await = chunks;
        info!("Company description replaced in memory ({count} chunks)");
        Ok(count)
    }
}

/// Orders chunks by how many distinct query words (3+ letters) they contain.
/// Without any overlap the leading chunks are returned as a general overview.
fn rank_chunks(chunks: &[String], query: &str, top_k: usize) -> Vec<String> {
    let terms: Vec<String> = query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_string)
        .collect();

    let mut scored: Vec<(usize, &String)> = chunks
        .iter()
        .map(|chunk| {
            let lower = chunk.to_lowercase();
            let hits = terms.iter().filter(|t| lower.contains(t.as_str())).count();
            (hits, chunk)
        })
        .filter(|(hits, _)| *hits > 0)
        .collect();

    if scored.is_empty() {
        return chunks.iter().take(top_k).cloned().collect();
    }

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(top_k).map(|(_, c)| c.clone()).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// HttpKnowledgeBase
// ────────────────────────────────────────────────────────────────────────────

/// Client for a vector search service exposing `/query` and `/upsert`.
pub struct HttpKnowledgeBase {
    client: Client,
    base_url: String,
    company_id: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    top_k: usize,
    company_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    text: String,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    company_id: &'a str,
    chunks: &'a [String],
}

impl HttpKnowledgeBase {
    pub fn new(base_url: &str, company_id: &str) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .context("Failed to build knowledge search HTTP client")?,
            base_url: base_url.trim_end_matches('/').to_string(),
            company_id: company_id.to_string(),
        })
    }
}

#[async_trait]
impl CompanyKnowledge for HttpKnowledgeBase {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        let response: QueryResponse = self
            .client
            .post(format!("{}/query", self.base_url))
            .json(&QueryRequest {
                query,
                top_k,
                company_id: &self.company_id,
            })
            .send()
            .await
            .context("Knowledge search request failed")?
            .error_for_status()?
            .json()
            .await
            .context("Knowledge search returned malformed JSON")?;

        Ok(response.matches.into_iter().map(|m| m.text).collect())
    }

    async fn replace_description(&self, description: &str) -> Result<usize> {
        let chunks = chunk_description(description);
        self.client
            .post(format!("{}/upsert", self.base_url))
            .json(&UpsertRequest {
                company_id: &self.company_id,
                chunks: &chunks,
            })
            .send()
            .await
            .context("Knowledge upsert request failed")?
            .error_for_status()?;

        info!(
            "Company vectors updated for {} ({} chunks)",
            self.company_id,
            chunks.len()
        );
        Ok(chunks.len())
    }
}
