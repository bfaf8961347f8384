//! Assemble the final course from a repaired plan

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{Course, ParsedPlan, Place, WeatherRecord};

/// Build the course for a repaired plan
///
/// Places follow the selection order and keep their candidate index. The
/// single weather record, when present, is attached to every selected place.
pub fn build_course(plan: ParsedPlan, places: &[Place], weather: Option<&WeatherRecord>) -> Course {
    debug!(selected = plan.selected_indices.len(), has_weather = weather.is_some(), "build_course: called");
    let selected: Vec<Place> = plan
        .selected_indices
        .iter()
        .filter_map(|&idx| {
            places.get(idx).map(|place| {
                let mut place = place.clone();
                place.index = idx;
                place
            })
        })
        .collect();

    let weather_info: BTreeMap<usize, WeatherRecord> = match weather {
        Some(record) => plan.selected_indices.iter().map(|&idx| (idx, record.clone())).collect(),
        None => BTreeMap::new(),
    };

    Course {
        places: selected,
        sequence: plan.sequence,
        estimated_duration: plan
            .estimated_duration
            .into_iter()
            .map(|(idx, minutes)| (idx.to_string(), minutes))
            .collect(),
        course_description: plan.course_description,
        weather_info,
        location: None,
        reasoning: Some(plan.reasoning).filter(|r| !r.is_empty()),
        route: None,
    }
}
