//! Plan validation error types

use thiserror::Error;

/// Fatal outcomes of turning planner text into a course
///
/// Every other defect in the planner output is repaired locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("Planner response contains no JSON object")]
    EmptyOrUnparsablePlan,

    #[error("Planner JSON could not be recovered: {0}")]
    UnrecoverablePlanJson(String),

    #[error("No places could be selected for the course")]
    NoSelectablePlaces,

    #[error("Planner returned an empty response")]
    EmptyResponse,
}
