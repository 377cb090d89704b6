//! Error types for the entire library.
//!
//! We use `thiserror` for library-style errors with custom types.
//! Failures raised by tracked bodies are never wrapped here: the tracker
//! hands them back to the caller exactly as the body produced them.

use thiserror::Error;

/// Errors that can occur while tracking spans
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Invalid tracker state: {0}")]
    InvalidState(String),
}

/// Errors that can occur while building ranked collections
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
