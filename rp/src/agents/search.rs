//! Search agent: candidate places for a theme and location

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{Agent, AgentError, Capability};
use crate::config::SearchConfig;
use crate::domain::{Place, assign_indices};
use crate::search::{SearchProvider, WebResult, WebSearch, trust_score};

/// What to search for
#[derive(Debug, Clone, PartialEq)]
pub struct SearchInput {
    pub theme: String,
    pub location: String,
}

impl SearchInput {
    pub fn query(&self) -> String {
        format!("{} {}", self.theme.trim(), self.location.trim()).trim().to_string()
    }
}

/// Finds, scores and ranks candidate places
pub struct SearchAgent {
    places: Arc<dyn SearchProvider>,
    web: Option<Arc<dyn WebSearch>>,
    config: SearchConfig,
}

impl SearchAgent {
    pub fn new(places: Arc<dyn SearchProvider>, config: SearchConfig) -> Self {
        debug!(max_results = config.max_results, min_rating = config.min_rating, "SearchAgent::new: called");
        Self {
            places,
            web: None,
            config,
        }
    }

    /// Corroborate candidates with web search results
    pub fn with_web_search(mut self, web: Arc<dyn WebSearch>) -> Self {
        self.web = Some(web);
        self
    }

    async fn web_results(&self, query: &str) -> Vec<WebResult> {
        let Some(web) = self.web.as_ref().filter(|_| self.config.web_mentions) else {
            return Vec::new();
        };
        match web.search(query, self.config.max_results).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "SearchAgent::web_results: web search failed, scoring without mentions");
                Vec::new()
            }
        }
    }
}

/// Attach web mentions and the trust score to one place
fn score_place(place: &mut Place, web: &[WebResult]) {
    let mut mentions = web.iter().filter(|hit| hit.mentions(&place.name));
    if let Some(first) = mentions.next() {
        if place.source_url.is_empty() {
            place.source_url = first.url.clone();
        }
        place.web_mentions = 1 + mentions.count() as u32;
    }
    place.trust_score = trust_score(place.rating, place.review_count, place.web_mentions);
}

/// Filter by rating, sort by trust and cap the list
fn rank(mut places: Vec<Place>, min_rating: f64, max_results: usize) -> Vec<Place> {
    places.retain(|p| p.rating.unwrap_or(0.0) >= min_rating);
    places.sort_by(|a, b| b.trust_score.total_cmp(&a.trust_score));
    places.truncate(max_results);
    assign_indices(&mut places);
    places
}

#[async_trait]
impl Agent for SearchAgent {
    type Input = SearchInput;
    type Output = Vec<Place>;

    fn capability(&self) -> Capability {
        Capability::Search
    }

    fn validate_input(&self, input: &SearchInput) -> Result<(), AgentError> {
        if input.theme.trim().is_empty() {
            return Err(AgentError::invalid(Capability::Search, "theme is required"));
        }
        Ok(())
    }

    async fn execute(&self, input: SearchInput) -> Result<Vec<Place>, AgentError> {
        let query = input.query();
        debug!(%query, "SearchAgent::execute: called");

        let mut places = self.places.search_places(&query).await?;
        let found = places.len();
        let web = self.web_results(&query).await;
        for place in &mut places {
            score_place(place, &web);
        }

        let ranked = rank(places, self.config.min_rating, self.config.max_results);
        info!(%query, found, kept = ranked.len(), web_hits = web.len(), "SearchAgent::execute: candidates ranked");
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchError;

    struct FixedPlaces(Vec<Place>);

    #[async_trait]
    impl SearchProvider for FixedPlaces {
        async fn search_places(&self, _query: &str) -> Result<Vec<Place>, SearchError> {
            Ok(self.0.clone())
        }
    }

    struct FixedWeb(Result<Vec<WebResult>, u16>);

    #[async_trait]
    impl WebSearch for FixedWeb {
        async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<WebResult>, SearchError> {
            match &self.0 {
                Ok(results) => Ok(results.clone()),
                Err(status) => Err(SearchError::Http {
                    status: *status,
                    message: "unavailable".to_string(),
                }),
            }
        }
    }

    fn hit(title: &str, url: &str) -> WebResult {
        WebResult {
            title: title.to_string(),
            url: url.to_string(),
            ..Default::default()
        }
    }

    fn candidates() -> Vec<Place> {
        vec![
            Place::new("Quiet Cafe").with_rating(4.9, Some(5)),
            Place::new("Leeum Museum").with_rating(4.6, Some(2100)),
            Place::new("Closed Diner").with_rating(3.1, Some(400)),
            Place::new("Unrated Gallery"),
        ]
    }

    #[tokio::test]
    async fn test_search_ranks_and_filters() {
        let agent = SearchAgent::new(Arc::new(FixedPlaces(candidates())), SearchConfig::default());
        let places = agent
            .run(SearchInput {
                theme: "art".to_string(),
                location: "Yongsan".to_string(),
            })
            .await
            .unwrap();

        let names: Vec<&str> = places.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Leeum Museum", "Quiet Cafe"]);
        assert_eq!(places[0].index, 0);
        assert_eq!(places[1].index, 1);
        assert!(places[0].trust_score > places[1].trust_score);
    }

    #[tokio::test]
    async fn test_web_mentions_raise_trust_and_set_source() {
        let web = FixedWeb(Ok(vec![
            hit("Quiet Cafe review", "https://blog.example/quiet"),
            hit("Top 10: Quiet Cafe and more", "https://list.example/top"),
        ]));
        let agent =
            SearchAgent::new(Arc::new(FixedPlaces(candidates())), SearchConfig::default()).with_web_search(Arc::new(web));
        let places = agent
            .execute(SearchInput {
                theme: "cafe".to_string(),
                location: String::new(),
            })
            .await
            .unwrap();

        let cafe = places.iter().find(|p| p.name == "Quiet Cafe").unwrap();
        assert_eq!(cafe.web_mentions, 2);
        assert_eq!(cafe.source_url, "https://blog.example/quiet");
        assert_eq!(cafe.trust_score, trust_score(Some(4.9), Some(5), 2));
    }

    #[tokio::test]
    async fn test_web_failure_is_ignored() {
        let agent = SearchAgent::new(Arc::new(FixedPlaces(candidates())), SearchConfig::default())
            .with_web_search(Arc::new(FixedWeb(Err(503))));
        let places = agent
            .execute(SearchInput {
                theme: "art".to_string(),
                location: "Seoul".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(places.len(), 2);
        assert!(places.iter().all(|p| p.web_mentions == 0));
    }

    #[tokio::test]
    async fn test_blank_theme_rejected() {
        let agent = SearchAgent::new(Arc::new(FixedPlaces(vec![])), SearchConfig::default());
        let err = agent
            .run(SearchInput {
                theme: "   ".to_string(),
                location: "Seoul".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidInput { .. }));
    }

    #[test]
    fn test_rank_caps_results() {
        let places: Vec<Place> = (0..5)
            .map(|i| {
                let mut p = Place::new(format!("p{}", i)).with_rating(4.5, Some(100));
                p.trust_score = f64::from(i);
                p
            })
            .collect();
        let ranked = rank(places, 4.0, 3);
        let names: Vec<&str> = ranked.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["p4", "p3", "p2"]);
    }

    #[test]
    fn test_query() {
        let input = SearchInput {
            theme: " night view ".to_string(),
            location: "".to_string(),
        };
        assert_eq!(input.query(), "night view");
    }
}
