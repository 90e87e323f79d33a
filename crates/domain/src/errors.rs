//! Error types used throughout the application
//!
//! Failures are always scoped to the single deadline or operation that
//! caused them; nothing here is fatal to the process. Note that a date
//! expression that cannot be resolved is NOT an error; it degrades to an
//! empty canonical date and stays editable (see `echodue-core`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for EchoDue
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum EchoDueError {
    /// A deadline without a resolved canonical date was submitted for sync.
    /// Distinct from network/auth failures: it is raised before any token
    /// or provider work happens.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The user declined consent or the provider rejected the token request.
    #[error("Authorization denied: {0}")]
    AuthDenied(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Provider-side failure, carrying the provider's message when one was
    /// returned.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for EchoDue operations
pub type Result<T> = std::result::Result<T, EchoDueError>;
