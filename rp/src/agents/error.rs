//! Agent error types

use thiserror::Error;

use super::Capability;
use crate::llm::LlmError;
use crate::maps::MapsError;
use crate::planner::PlanError;
use crate::search::SearchError;

/// Errors raised while validating or executing an agent
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid {capability} input: {reason}")]
    InvalidInput { capability: Capability, reason: String },

    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Plan generation failed: {0}")]
    Plan(#[from] PlanError),

    #[error("Directions failed: {0}")]
    Maps(#[from] MapsError),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl AgentError {
    pub fn invalid(capability: Capability, reason: impl Into<String>) -> Self {
        AgentError::InvalidInput {
            capability,
            reason: reason.into(),
        }
    }
}
