//! Google Places text search client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{SearchError, SearchProvider};
use crate::config::MapsConfig;
use crate::domain::{Coordinates, Place};

/// Place types too generic to describe a place
const GENERIC_TYPES: &[&str] = &["point_of_interest", "establishment"];

/// Candidate search backed by the Places Text Search API
pub struct GooglePlacesClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl GooglePlacesClient {
    /// Create a client from the maps configuration
    pub fn from_config(config: &MapsConfig) -> Result<Self, SearchError> {
        debug!(base_url = %config.base_url, "GooglePlacesClient::from_config: called");
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
}

#[async_trait]
impl SearchProvider for GooglePlacesClient {
    async fn search_places(&self, query: &str) -> Result<Vec<Place>, SearchError> {
        debug!(%query, "GooglePlacesClient::search_places: called");
        let url = format!("{}/maps/api/place/textsearch/json", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("query", query), ("key", self.api_key.as_str())])
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

        let body: PlacesResponse = response.json().await?;
        let places = parse_places_response(body)?;
        info!(%query, count = places.len(), "GooglePlacesClient::search_places: found places");
        Ok(places)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlacesResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    name: String,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    user_ratings_total: Option<u32>,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn category_from_types(types: &[String]) -> String {
    types
        .iter()
        .find(|t| !GENERIC_TYPES.contains(&t.as_str()))
        .map(|t| t.replace('_', " "))
        .unwrap_or_default()
}

/// Convert a text search response into candidates
///
/// `ZERO_RESULTS` is an empty list, any other non-`OK` status an error.
pub(crate) fn parse_places_response(body: PlacesResponse) -> Result<Vec<Place>, SearchError> {
    debug!(status = %body.status, count = body.results.len(), "parse_places_response: called");
    match body.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Ok(Vec::new()),
        _ => {
            return Err(SearchError::Provider {
                status: body.status,
                message: body.error_message.unwrap_or_default(),
            });
        }
    }

    Ok(body
        .results
        .into_iter()
        .map(|r| Place {
            category: category_from_types(&r.types),
            rating: r.rating,
            review_count: r.user_ratings_total,
            address: r.formatted_address.unwrap_or_default(),
            coordinates: r.geometry.map(|g| Coordinates::new(g.location.lat, g.location.lng)),
            ..Place::new(r.name)
        })
        .collect())
}
