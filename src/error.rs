//! Error types for Concierge
//!
//! This module defines all error types used throughout the chat session
//! engine, using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Concierge operations
///
/// This enum encompasses all possible errors that can occur during
/// envelope decoding, transport calls, session management, and
/// configuration loading.
#[derive(Error, Debug)]
pub enum ConciergeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-related errors (send, history fetch, clear)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Session state errors
    #[error("Session error: {0}")]
    Session(String),

    /// A prompt was submitted while a previous turn is still in flight
    ///
    /// The engine rejects overlapping submissions rather than queuing them,
    /// preserving the at-most-one-placeholder invariant on the timeline.
    #[error("A submission is already in flight; wait for the current turn to resolve")]
    SubmissionInFlight,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Concierge operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
