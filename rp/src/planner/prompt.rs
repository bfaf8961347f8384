//! Candidate capping and the compact place list shown to the planner

use tracing::{debug, info};

use crate::domain::{Place, assign_indices};

const MAX_ADDRESS_CHARS: usize = 30;
const TRUNCATED_ADDRESS_CHARS: usize = 27;

/// Order and cap the candidate pool before prompting
///
/// Saved places come first in input order, then the rest by descending
/// trust score. The cap only trims the unsaved remainder, so every saved
/// place survives even when they alone exceed it. Indices are assigned here
/// and never change afterwards.
pub fn prepare_candidates(places: Vec<Place>, cap: usize) -> Vec<Place> {
    debug!(place_count = places.len(), cap, "prepare_candidates: called");
    let total = places.len();
    let (mut prepared, mut rest): (Vec<Place>, Vec<Place>) = places.into_iter().partition(|p| p.is_saved_place);
    rest.sort_by(|a, b| b.trust_score.total_cmp(&a.trust_score));

    let room = cap.saturating_sub(prepared.len());
    if total > cap {
        info!(total, cap, saved = prepared.len(), "prepare_candidates: capping candidate pool");
        rest.truncate(room);
    }
    prepared.extend(rest);
    assign_indices(&mut prepared);
    prepared
}

fn format_rating(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{:.1}", rating)
    } else {
        format!("{}", rating)
    }
}

fn shorten_address(address: &str) -> String {
    if address.chars().count() > MAX_ADDRESS_CHARS {
        let head: String = address.chars().take(TRUNCATED_ADDRESS_CHARS).collect();
        format!("{}...", head)
    } else {
        address.to_string()
    }
}

/// One line per place: `[i] name|category|★|lat,lng|★rating|address`
///
/// Empty parts are left out.
pub fn format_places_for_prompt(places: &[Place]) -> String {
    debug!(place_count = places.len(), "format_places_for_prompt: called");
    places
        .iter()
        .enumerate()
        .map(|(i, place)| {
            let mut line = format!("[{}] {}", i, place.name);
            if !place.category.is_empty() {
                line.push_str(&format!("|{}", place.category));
            }
            if place.is_saved_place {
                line.push_str("|★");
            }
            if let Some(coords) = place.coordinates {
                line.push_str(&format!("|{:.3},{:.3}", coords.lat, coords.lng));
            }
            if let Some(rating) = place.rating.filter(|r| *r > 0.0) {
                line.push_str(&format!("|★{}", format_rating(rating)));
            }
            if !place.address.is_empty() {
                line.push_str(&format!("|{}", shorten_address(&place.address)));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
