//! Directions and weather
//!
//! Provider traits for route verification and weather lookup, the Google
//! implementation and the waypoint ordering policy.

mod error;
mod google;
mod waypoints;

pub use error::MapsError;
pub use google::GoogleMapsClient;
pub use waypoints::WaypointPolicy;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Place, WeatherRecord};

/// How the traveller moves between places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
    Transit,
    Bicycling,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Transit => "transit",
            TravelMode::Bicycling => "bicycling",
        }
    }

    fn from_keyword(text: &str) -> Option<Self> {
        let text = text.trim().to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| text.contains(w));
        if has(&["walk", "foot", "도보", "걷"]) {
            Some(TravelMode::Walking)
        } else if has(&["bike", "bicycl", "cycl", "자전거"]) {
            Some(TravelMode::Bicycling)
        } else if has(&["transit", "subway", "metro", "bus", "train", "지하철", "버스", "대중교통"]) {
            Some(TravelMode::Transit)
        } else if has(&["car", "driv", "taxi", "자동차", "택시", "자차"]) {
            Some(TravelMode::Driving)
        } else {
            None
        }
    }

    /// Mode for a free-text transportation preference
    ///
    /// Preferences are comma separated; the first recognised one wins.
    pub fn from_preference(preference: &str, fallback: TravelMode) -> TravelMode {
        preference.split(',').find_map(Self::from_keyword).unwrap_or(fallback)
    }
}

impl FromStr for TravelMode {
    type Err = MapsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "driving" => Ok(TravelMode::Driving),
            "walking" => Ok(TravelMode::Walking),
            "transit" => Ok(TravelMode::Transit),
            "bicycling" => Ok(TravelMode::Bicycling),
            other => Err(MapsError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One hop between consecutive places
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub from: String,
    pub to: String,
    pub duration_secs: u64,
    pub distance_m: u64,
}

/// Verified route through a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub mode: TravelMode,
    /// Place indices in travel order
    pub order: Vec<usize>,
    pub legs: Vec<RouteLeg>,
    pub total_duration_secs: u64,
    pub total_distance_m: u64,
}

impl RouteSummary {
    /// Sum the legs into a summary
    pub fn from_legs(mode: TravelMode, order: Vec<usize>, legs: Vec<RouteLeg>) -> Self {
        Self {
            mode,
            order,
            total_duration_secs: legs.iter().map(|l| l.duration_secs).sum(),
            total_distance_m: legs.iter().map(|l| l.distance_m).sum(),
            legs,
        }
    }
}

/// Travel time and distance between ordered places
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn route(&self, places: &[Place], mode: TravelMode) -> Result<RouteSummary, MapsError>;
}

/// Weather at a coordinate, optionally on a `YYYY-MM-DD` date
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn weather(&self, lat: f64, lng: f64, date: Option<&str>) -> Result<WeatherRecord, MapsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_preference() {
        assert_eq!(TravelMode::from_preference("walking", TravelMode::Transit), TravelMode::Walking);
        assert_eq!(TravelMode::from_preference("subway, walking", TravelMode::Driving), TravelMode::Transit);
        assert_eq!(TravelMode::from_preference("Taxi", TravelMode::Transit), TravelMode::Driving);
        assert_eq!(TravelMode::from_preference("대중교통", TravelMode::Walking), TravelMode::Transit);
        assert_eq!(TravelMode::from_preference("hot air balloon", TravelMode::Transit), TravelMode::Transit);
        assert_eq!(TravelMode::from_preference("", TravelMode::Walking), TravelMode::Walking);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Transit".parse::<TravelMode>().unwrap(), TravelMode::Transit);
        assert!(matches!("teleport".parse::<TravelMode>(), Err(MapsError::UnknownMode(_))));
    }

    #[test]
    fn test_summary_totals() {
        let legs = vec![
            RouteLeg {
                from: "a".to_string(),
                to: "b".to_string(),
                duration_secs: 600,
                distance_m: 800,
            },
            RouteLeg {
                from: "b".to_string(),
                to: "c".to_string(),
                duration_secs: 300,
                distance_m: 450,
            },
        ];
        let summary = RouteSummary::from_legs(TravelMode::Walking, vec![2, 0, 1], legs);
        assert_eq!(summary.total_duration_secs, 900);
        assert_eq!(summary.total_distance_m, 1250);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["mode"], "walking");
    }
}
