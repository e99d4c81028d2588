//! Custom error types for bibfetch.
//!
//! This module defines the fatal error tier: failures that end the session
//! (configuration, network, bibliography-file problems). They are printed
//! once at the top level without a stack trace. Recoverable input mistakes
//! (bad commands, invalid keys) never construct these; they are reported at
//! the prompt and the prompt repeats.

use thiserror::Error;

/// Main error type for bibfetch operations.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
#[derive(Debug, Error)]
pub enum BibfetchError {
    /// Configuration file missing, malformed, or incomplete
    #[error("Config error: {0}")]
    Config(String),

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The search service returned an error
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code from the service
        code: i32,
        /// Error message from the service
        message: String,
    },

    /// Bibliography text could not be parsed as BibTeX
    #[error("BibTeX error: {0}")]
    Bibtex(String),

    /// File or console I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using `BibfetchError`
pub type Result<T> = std::result::Result<T, BibfetchError>;
