//! Field-level repair of a recovered plan object against the candidate list

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::PlanError;
use crate::domain::{ParsedPlan, Place};

/// How many leading candidates to pick when the planner selected nothing
pub const DEFAULT_FALLBACK_COUNT: usize = 5;

/// Repair selection, sequence, durations and text fields
///
/// Indices refer to positions in `places`. The result satisfies the
/// `ParsedPlan` invariants whatever the object contained.
///
/// Saved places the planner left out are put in front of the selection as
/// one block in ascending index order, not pushed to the front one at a
/// time (which would reverse them).
pub fn repair_plan(object: &Map<String, Value>, places: &[Place], fallback_count: usize) -> Result<ParsedPlan, PlanError> {
    debug!(place_count = places.len(), fallback_count, "repair_plan: called");
    let saved: Vec<usize> = places
        .iter()
        .enumerate()
        .filter(|(_, place)| place.is_saved_place)
        .map(|(i, _)| i)
        .collect();

    let selected_indices = repair_selection(object.get("selected_places"), places.len(), &saved, fallback_count)?;
    let sequence = repair_sequence(object.get("sequence"), &selected_indices);
    let estimated_duration = repair_durations(object.get("estimated_duration"), &selected_indices);

    Ok(ParsedPlan {
        selected_indices,
        sequence,
        estimated_duration,
        course_description: text_field(object, "course_description"),
        reasoning: text_field(object, "reasoning"),
    })
}

/// Integer entries of a list field, anything else dropped
fn integer_entries(value: Option<&Value>, field: &str) -> Vec<usize> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let idx = item.as_u64().and_then(|n| usize::try_from(n).ok());
                if idx.is_none() {
                    warn!(field, value = %item, "integer_entries: dropping non-integer entry");
                }
                idx
            })
            .collect(),
        Some(other) => {
            warn!(field, value = %other, "integer_entries: field is not a list");
            Vec::new()
        }
        None => {
            warn!(field, "integer_entries: field missing");
            Vec::new()
        }
    }
}

fn repair_selection(
    value: Option<&Value>,
    place_count: usize,
    saved: &[usize],
    fallback_count: usize,
) -> Result<Vec<usize>, PlanError> {
    let mut selected: Vec<usize> = Vec::new();
    for idx in integer_entries(value, "selected_places") {
        if idx >= place_count {
            warn!(idx, place_count, "repair_selection: dropping out-of-range index");
        } else if selected.contains(&idx) {
            debug!(idx, "repair_selection: dropping duplicate index");
        } else {
            selected.push(idx);
        }
    }

    let missing: Vec<usize> = saved.iter().copied().filter(|idx| !selected.contains(idx)).collect();
    if !missing.is_empty() {
        warn!(?missing, "repair_selection: forcing saved places to the front");
        selected.splice(0..0, missing);
    }

    // Saved places are always present by now, so an empty selection means
    // there are none and only the leading candidates remain.
    if selected.is_empty() {
        let count = fallback_count.min(place_count);
        if count == 0 {
            return Err(PlanError::NoSelectablePlaces);
        }
        warn!(count, "repair_selection: nothing selected, using the leading candidates");
        selected = (0..count).collect();
    }

    Ok(selected)
}

/// Keep the planner's visit order when it covers exactly the selection
///
/// A deduplicated list of selected indices with the selection's length is a
/// permutation of it, so saved places and every selected index are covered.
/// Anything else is replaced by the selection order.
fn repair_sequence(value: Option<&Value>, selected: &[usize]) -> Vec<usize> {
    let mut sequence: Vec<usize> = Vec::new();
    for idx in integer_entries(value, "sequence") {
        if !selected.contains(&idx) {
            warn!(idx, "repair_sequence: dropping index outside the selection");
        } else if !sequence.contains(&idx) {
            sequence.push(idx);
        }
    }

    if sequence.len() != selected.len() {
        warn!(
            kept = sequence.len(),
            expected = selected.len(),
            "repair_sequence: regenerating sequence in selection order"
        );
        return selected.to_vec();
    }
    sequence
}

fn repair_durations(value: Option<&Value>, selected: &[usize]) -> BTreeMap<usize, u32> {
    let object = match value {
        Some(Value::Object(object)) => object,
        Some(other) => {
            warn!(value = %other, "repair_durations: estimated_duration is not an object");
            return BTreeMap::new();
        }
        None => return BTreeMap::new(),
    };

    object
        .iter()
        .filter_map(|(key, minutes)| {
            let idx = key.trim().parse::<usize>().ok().filter(|idx| selected.contains(idx));
            match (idx, duration_minutes(minutes)) {
                (Some(idx), Some(minutes)) => Some((idx, minutes)),
                _ => {
                    debug!(key = %key, value = %minutes, "repair_durations: dropping entry");
                    None
                }
            }
        })
        .collect()
}

/// Minutes from a JSON integer, a non-negative float or a numeric string
fn duration_minutes(value: &Value) -> Option<u32> {
    let minutes = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if minutes.is_finite() && (0.0..=f64::from(u32::MAX)).contains(&minutes) {
        Some(minutes.round() as u32)
    } else {
        None
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => String::new(),
        Some(other) => {
            warn!(key, value = %other, "text_field: non-string value replaced with empty text");
            String::new()
        }
    }
}
