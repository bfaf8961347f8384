//! Candidate search
//!
//! Place search and web search behind traits, with Google Places and Tavily
//! implementations and the trust score used to rank candidates.

mod error;
mod places;
mod tavily;
mod trust;

pub use error::SearchError;
pub use places::GooglePlacesClient;
pub use tavily::TavilyClient;
pub use trust::{PRIOR_MEAN, PRIOR_WEIGHT, trust_score};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Place;

/// Finds candidate places for a free-text query
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search_places(&self, query: &str) -> Result<Vec<Place>, SearchError>;
}

/// One web search hit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebResult {
    pub title: String,
    pub url: String,
    pub content: String,
    pub score: f64,
}

impl WebResult {
    /// Whether the title or content names the place
    pub fn mentions(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        !name.is_empty() && (self.title.to_lowercase().contains(&name) || self.content.to_lowercase().contains(&name))
    }
}

/// Free-text web search used to corroborate candidates
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>, SearchError>;
}
