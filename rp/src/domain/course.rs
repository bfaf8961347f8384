//! Planner output types: parsed plans and validated courses

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Place;
use crate::maps::RouteSummary;

/// Weather at the destination on the visit date
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherRecord {
    /// Degrees Celsius
    pub temperature: Option<f64>,
    pub condition: String,
    pub date: Option<String>,
}

impl WeatherRecord {
    /// Temperature and condition, e.g. `12.3°C, Light rain`
    pub fn label(&self) -> String {
        let temp = self
            .temperature
            .map(|t| format!("{:.1}°C", t))
            .unwrap_or_else(|| "N/A".to_string());
        let condition = if self.condition.is_empty() { "unknown" } else { &self.condition };
        format!("{}, {}", temp, condition)
    }

    /// One-line summary fed to the planner prompt
    pub fn summary(&self) -> String {
        format!(
            "Local weather: {}. Prefer outdoor places in good weather, indoor places in bad weather, \
             and keep travel short when the weather is poor.",
            self.label()
        )
    }
}

/// Structurally valid plan recovered from planner text
///
/// Holds after repair: `sequence` is a permutation of `selected_indices`,
/// every index is a valid place index, every saved place is selected and
/// sequenced, and every duration key is a selected index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedPlan {
    pub selected_indices: Vec<usize>,
    pub sequence: Vec<usize>,
    pub estimated_duration: BTreeMap<usize, u32>,
    pub course_description: String,
    pub reasoning: String,
}

/// The final itinerary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Course {
    /// Selected places, in selection order
    pub places: Vec<Place>,
    /// Original place indices in visit order
    pub sequence: Vec<usize>,
    /// Stay duration in minutes keyed by original index
    pub estimated_duration: BTreeMap<String, u32>,
    pub course_description: String,
    pub weather_info: BTreeMap<usize, WeatherRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteSummary>,
}

impl Course {
    /// Places in visit order
    pub fn visit_order(&self) -> Vec<&Place> {
        self.sequence
            .iter()
            .filter_map(|idx| self.places.iter().find(|p| p.index == *idx))
            .collect()
    }

    /// Planned stay for a place, in minutes
    pub fn duration_for(&self, index: usize) -> Option<u32> {
        self.estimated_duration.get(&index.to_string()).copied()
    }
}
