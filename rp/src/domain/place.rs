//! Place records produced by the search stage

use serde::{Deserialize, Serialize};

/// Latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Format as `lat,lng` for query parameters
    pub fn to_query(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

/// A candidate place
///
/// `index` is the position in the candidate list handed to the planner. It
/// is assigned once before any LLM call and never renumbered afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Place {
    pub index: usize,
    pub name: String,
    pub category: String,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub trust_score: f64,
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub is_saved_place: bool,
    pub source_url: String,
    /// Number of web search results mentioning this place
    pub web_mentions: u32,
}

impl Place {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_rating(mut self, rating: f64, review_count: Option<u32>) -> Self {
        self.rating = Some(rating);
        self.review_count = review_count;
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some(Coordinates::new(lat, lng));
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn saved(mut self) -> Self {
        self.is_saved_place = true;
        self
    }

    /// Case-insensitive name comparison used when merging saved places
    pub fn same_name(&self, other: &str) -> bool {
        self.name.trim().to_lowercase() == other.trim().to_lowercase()
    }
}

/// Re-assign `index` to each place's position in the slice
pub fn assign_indices(places: &mut [Place]) {
    for (i, place) in places.iter_mut().enumerate() {
        place.index = i;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_builder() {
        let place = Place::new("Gyeongbokgung")
            .with_category("palace")
            .with_rating(4.7, Some(1200))
            .with_coordinates(37.5796, 126.9770)
            .saved();

        assert_eq!(place.name, "Gyeongbokgung");
        assert_eq!(place.rating, Some(4.7));
        assert_eq!(place.review_count, Some(1200));
        assert!(place.is_saved_place);
        assert_eq!(place.coordinates.unwrap().to_query(), "37.5796,126.977");
    }

    #[test]
    fn test_same_name_ignores_case_and_whitespace() {
        let place = Place::new("Seoul Forest");
        assert!(place.same_name("  seoul forest "));
        assert!(!place.same_name("Seoul Forest Park"));
    }

    #[test]
    fn test_assign_indices() {
        let mut places = vec![Place::new("a"), Place::new("b"), Place::new("c")];
        places[2].index = 9;
        assign_indices(&mut places);
        let indices: Vec<usize> = places.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_deserialize_sparse_place() {
        let place: Place = serde_json::from_str(r#"{"name":"Cafe","is_saved_place":true}"#).unwrap();
        assert_eq!(place.name, "Cafe");
        assert!(place.is_saved_place);
        assert!(place.coordinates.is_none());
        assert_eq!(place.trust_score, 0.0);
    }
}
