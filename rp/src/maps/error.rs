//! Maps error types

use thiserror::Error;

/// Errors from the directions and weather providers
#[derive(Debug, Error)]
pub enum MapsError {
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Provider returned {status}: {message}")]
    Provider { status: String, message: String },

    #[error("No route from {from} to {to}")]
    NoRoute { from: String, to: String },

    #[error("Unknown travel mode: {0}")]
    UnknownMode(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
