//! services/assistant/src/error.rs
//!
//! Defines the primary error type for the assistant service.

use crate::config::ConfigError;
use records_assistant_core::session::SessionError;

/// The primary error type for the `assistant` service.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The session was closed while the front end still issued operations.
    #[error("Session Error: {0}")]
    Session(#[from] SessionError),

    /// Represents a standard Input/Output error (e.g., reading the terminal).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
