//! Trip requests and the preferences derived from them

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Coordinates, Place};

/// A place the user pinned before planning
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedPlace {
    pub name: String,
    pub category: String,
    pub address: String,
    pub coordinates: Option<Coordinates>,
}

impl SavedPlace {
    /// Convert into a flagged candidate
    pub fn into_place(self) -> Place {
        Place {
            name: self.name,
            category: self.category,
            address: self.address,
            coordinates: self.coordinates,
            is_saved_place: true,
            ..Default::default()
        }
    }
}

/// Body of `POST /api/create-trip`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TripRequest {
    pub theme: String,
    pub location: String,
    pub group_size: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub visit_time: Option<String>,
    pub transportation: Vec<String>,
    pub custom_transport: Option<String>,
    pub saved_places: Vec<SavedPlace>,
}

/// Preferences handed to the planner prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub theme: String,
    pub location: String,
    pub group_size: String,
    pub visit_date: String,
    pub visit_time: String,
    pub transportation: String,
}

impl UserPreferences {
    /// Preferences with every optional field at its default
    pub fn for_theme(theme: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            location: location.into(),
            group_size: "1".to_string(),
            visit_date: "today".to_string(),
            visit_time: "afternoon".to_string(),
            transportation: "walking".to_string(),
        }
    }
}

/// Time window for the course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeConstraints {
    pub start_time: String,
    pub end_time: String,
    /// Minutes
    pub total_duration: u32,
}

impl TimeConstraints {
    /// Derive the window from a free-text visit time
    pub fn from_visit_time(visit_time: &str) -> Self {
        let lower = visit_time.to_lowercase();
        let afternoon = lower.contains("afternoon") || lower.contains("pm") || visit_time.contains("오후");
        Self {
            start_time: if afternoon { "14:00" } else { "10:00" }.to_string(),
            end_time: "20:00".to_string(),
            total_duration: 360,
        }
    }
}

/// Everything one pipeline run needs
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineInput {
    pub theme: String,
    pub location: String,
    pub preferences: UserPreferences,
    pub time_constraints: Option<TimeConstraints>,
    pub saved_places: Vec<SavedPlace>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl TripRequest {
    /// Normalise the wire request into pipeline input
    pub fn into_pipeline_input(self) -> PipelineInput {
        debug!(theme = %self.theme, location = %self.location, "into_pipeline_input: called");
        let mut preferences = UserPreferences::for_theme(self.theme.trim(), self.location.trim());

        if let Some(group) = non_blank(&self.group_size) {
            preferences.group_size = group.to_string();
        }

        let start = non_blank(&self.start_date);
        let end = non_blank(&self.end_date);
        match (start, end) {
            (Some(s), Some(e)) if s != e => preferences.visit_date = format!("{} ~ {}", s, e),
            (Some(s), _) => preferences.visit_date = s.to_string(),
            _ => {}
        }

        let time_constraints = non_blank(&self.visit_time).map(|t| {
            preferences.visit_time = t.to_string();
            TimeConstraints::from_visit_time(t)
        });

        let mut modes: Vec<String> = self
            .transportation
            .iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if let Some(custom) = non_blank(&self.custom_transport) {
            modes.push(custom.to_string());
        }
        if !modes.is_empty() {
            preferences.transportation = modes.join(", ");
        }

        PipelineInput {
            theme: preferences.theme.clone(),
            location: preferences.location.clone(),
            preferences,
            time_constraints,
            saved_places: self.saved_places,
        }
    }
}
