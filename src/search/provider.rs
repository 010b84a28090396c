//! External search providers
//!
//! Every provider failure (transport, timeout, quota, malformed body) is
//! reported as [`AppError::Provider`]. The gateway turns that into an empty
//! result set, so nothing here is ever fatal to a run.

use crate::types::{AppError, ResultItem, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A web search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search and return at most `max_results` items in provider order.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<ResultItem>>;

    /// Short provider name for logs and reports.
    fn name(&self) -> &str;
}

// ============================================================================
// Tavily
// ============================================================================

pub const TAVILY_DEFAULT_BASE_URL: &str = "https://api.tavily.com";

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    score: Option<f32>,
}

impl From<TavilyResult> for ResultItem {
    fn from(result: TavilyResult) -> Self {
        ResultItem {
            title: result.title,
            snippet: result.content,
            url: result.url,
            score: result.score,
        }
    }
}

/// Tavily search API over HTTPS.
pub struct TavilyProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TavilyProvider {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("prism/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<ResultItem>> {
        let body = TavilyRequest {
            api_key: &self.api_key,
            query,
            max_results,
            include_answer: false,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Tavily request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Tavily returned {}: {}",
                status, detail
            )));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Malformed Tavily response: {}", e)))?;

        Ok(parsed
            .results
            .into_iter()
            .take(max_results)
            .map(ResultItem::from)
            .collect())
    }

    fn name(&self) -> &str {
        "tavily"
    }
}

// ============================================================================
// DuckDuckGo
// ============================================================================

/// Keyless web search through daedra's DuckDuckGo backend.
#[derive(Debug, Default)]
pub struct DuckDuckGoProvider;

impl DuckDuckGoProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<ResultItem>> {
        let args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: max_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&args)
            .await
            .map_err(|e| AppError::Provider(format!("DuckDuckGo search failed: {}", e)))?;

        Ok(response
            .data
            .iter()
            .take(max_results)
            .map(|r| ResultItem::new(r.title.clone(), r.description.clone(), r.url.clone()))
            .collect())
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}
