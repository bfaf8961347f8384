//! Tavily web search client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{SearchError, WebResult, WebSearch};
use crate::config::SearchConfig;

/// Web search backed by the Tavily API
pub struct TavilyClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl TavilyClient {
    /// Create a client from the search configuration
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        debug!(base_url = %config.base_url, "TavilyClient::from_config: called");
        let api_key = config.get_api_key().map_err(|e| SearchError::Config(e.to_string()))?;
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(SearchError::Network)?;
        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn build_request_body(query: &str, max_results: usize) -> serde_json::Value {
        serde_json::json!({
            "query": query,
            "max_results": max_results,
            "search_depth": "basic",
        })
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>, SearchError> {
        debug!(%query, max_results, "TavilyClient::search: called");
        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&Self::build_request_body(query, max_results))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: TavilyResponse = response.json().await?;
        debug!(count = body.results.len(), "TavilyClient::search: received results");
        Ok(body.results)
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let body = TavilyClient::build_request_body("seongsu cafes", 7);
        assert_eq!(body["query"], "seongsu cafes");
        assert_eq!(body["max_results"], 7);
        assert_eq!(body["search_depth"], "basic");
    }

    #[test]
    fn test_parse_response() {
        let body: TavilyResponse = serde_json::from_str(
            r#"{
                "query": "seongsu cafes",
                "results": [
                    {"title": "Best cafes in Seongsu", "url": "https://example.com/a", "content": "Daelim Changgo is...", "score": 0.91},
                    {"title": "Untitled", "url": "https://example.com/b"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(body.results.len(), 2);
        assert_eq!(body.results[0].score, 0.91);
        assert!(body.results[1].content.is_empty());
    }
}
