//! Plan response validation
//!
//! Turns unreliable planner text into a structurally sound course through a
//! pure chain: extract the JSON object, recover it if malformed, then repair
//! its fields against the candidate list. No step performs I/O.

mod course;
mod error;
mod extract;
mod prompt;
mod repair;

pub use course::build_course;
pub use error::PlanError;
pub use extract::{ExtractedPlan, Rung, extract_plan_json};
pub use prompt::{format_places_for_prompt, prepare_candidates};
pub use repair::{DEFAULT_FALLBACK_COUNT, repair_plan};

use tracing::{debug, info};

use crate::domain::{ParsedPlan, Place};

/// A repaired plan and the recovery step it needed
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPlan {
    pub plan: ParsedPlan,
    pub rung: Rung,
}

/// Run the full extract, recover and repair chain
pub fn validate_plan_response(text: &str, places: &[Place], fallback_count: usize) -> Result<ValidatedPlan, PlanError> {
    debug!(text_len = text.len(), place_count = places.len(), "validate_plan_response: called");
    let extracted = extract_plan_json(text)?;
    let plan = repair_plan(&extracted.object, places, fallback_count)?;
    info!(
        selected = plan.selected_indices.len(),
        rung = ?extracted.rung,
        "validate_plan_response: plan validated"
    );
    Ok(ValidatedPlan {
        plan,
        rung: extracted.rung,
    })
}
