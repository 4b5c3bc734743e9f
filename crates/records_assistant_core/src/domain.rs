//! crates/records_assistant_core/src/domain.rs
//!
//! Defines the pure, core data structures of a records session.
//! These structs are independent of any runtime or serialization format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use uuid::Uuid;

//=========================================================================================
// File Intake
//=========================================================================================

/// Where the raw content of an incoming file can be read from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Content already held in memory (drag-and-drop payloads, tests).
    Bytes(Bytes),
    /// Content still on disk; read lazily by the document reader.
    Path(PathBuf),
}

/// A raw file handle handed over by the file-selection collaborator.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub size_bytes: u64,
    pub source: FileSource,
}

impl IncomingFile {
    /// Wraps an in-memory payload. The size is taken from the payload itself.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            size_bytes: data.len() as u64,
            source: FileSource::Bytes(data),
        }
    }

    /// Wraps a file on disk. The display name is the final path component.
    pub fn from_path(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            size_bytes,
            source: FileSource::Path(path),
        }
    }
}

//=========================================================================================
// Documents
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Pending,
    Ready,
    Failed,
}

/// A document accepted into the session.
///
/// `extracted_text` is only ever set together with `DocumentStatus::Ready`.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub id: Uuid,
    pub source_name: String,
    pub size_bytes: u64,
    pub status: DocumentStatus,
    pub extracted_text: Option<String>,
}

impl UploadedDocument {
    /// Creates the pending record for a freshly ingested file.
    pub fn pending(file: &IncomingFile) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_name: file.name.clone(),
            size_bytes: file.size_bytes,
            status: DocumentStatus::Pending,
            extracted_text: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == DocumentStatus::Ready
    }
}

//=========================================================================================
// Summary
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Generating,
    Done,
}

/// The generated narrative for the session's ready documents.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub text: Option<String>,
    pub generation_state: GenerationState,
}

impl Summary {
    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }
}

//=========================================================================================
// Conversation
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// A single entry of the append-only conversation.
#[derive(Debug, Clone)]
pub struct ConversationMessage {
    pub id: Uuid,
    pub role: Role,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn new(role: Role, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            body: body.into(),
            created_at: Utc::now(),
        }
    }
}
