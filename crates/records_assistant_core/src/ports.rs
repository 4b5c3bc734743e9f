//! crates/records_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) the session coordinator depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of how files are read or how answers are produced.

use async_trait::async_trait;
use crate::domain::IncomingFile;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentReader: Send + Sync {
    /// Reads the raw file as text. No format-specific parsing is attempted.
    async fn read_text(&self, file: &IncomingFile) -> PortResult<String>;
}

#[async_trait]
pub trait SummaryGenerationService: Send + Sync {
    /// Produces a narrative from the concatenated text of the ready documents.
    async fn generate_summary(&self, combined_text: &str, document_count: usize)
        -> PortResult<String>;
}

#[async_trait]
pub trait QuestionAnsweringService: Send + Sync {
    /// Answers a question based on a provided context (the current summary).
    async fn answer_question(&self, question: &str, context: &str) -> PortResult<String>;
}
