//! Search error types

use thiserror::Error;

/// Errors from the place and web search providers
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Provider returned {status}: {message}")]
    Provider { status: String, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
