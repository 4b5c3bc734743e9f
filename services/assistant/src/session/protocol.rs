//! services/assistant/src/session/protocol.rs
//!
//! Defines what the coordinator tells the presentation layer: the notifications
//! emitted on every state change, and the read-only snapshot used for rendering.
//!
//! Domain types from the core crate stay serialization-free; the views below are
//! their serializable mirrors.

use chrono::{DateTime, Utc};
use records_assistant_core::{
    domain::{ConversationMessage, DocumentStatus, GenerationState, Role, Summary, UploadedDocument},
    session::{SessionPhase, SessionState},
};
use serde::Serialize;
use uuid::Uuid;

use crate::adapters::keyword_qa::SUGGESTED_QUESTIONS;

//=========================================================================================
// Notifications Sent FROM the Coordinator TO the Presentation Layer
//=========================================================================================

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Represents every state change the presentation layer may want to render.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A batch was ingested; every document is still pending.
    DocumentsAdded { documents: Vec<DocumentView> },

    /// A pending document settled as ready or failed.
    DocumentUpdated { document: DocumentView },

    DocumentRemoved { document_id: Uuid },

    /// The last document was removed; summary and conversation are gone.
    SessionCleared,

    SummaryUpdated { summary: SummaryView },

    MessageAppended { message: MessageView },

    /// Signals that a question is being answered. The UI can show "Thinking...".
    AnsweringStarted,

    /// Signals that answering finished, successfully or not.
    AnsweringEnded,

    /// A transient, user-visible notice (the toast of the page).
    Notice { level: NoticeLevel, message: String },
}

//=========================================================================================
// Read-Only Views
//=========================================================================================

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatusView {
    Pending,
    Ready,
    Failed,
}

impl From<DocumentStatus> for DocumentStatusView {
    fn from(status: DocumentStatus) -> Self {
        match status {
            DocumentStatus::Pending => Self::Pending,
            DocumentStatus::Ready => Self::Ready,
            DocumentStatus::Failed => Self::Failed,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DocumentView {
    pub id: Uuid,
    pub source_name: String,
    pub size_bytes: u64,
    pub status: DocumentStatusView,
    pub extracted_text: Option<String>,
}

impl From<&UploadedDocument> for DocumentView {
    fn from(doc: &UploadedDocument) -> Self {
        Self {
            id: doc.id,
            source_name: doc.source_name.clone(),
            size_bytes: doc.size_bytes,
            status: doc.status.into(),
            extracted_text: doc.extracted_text.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStateView {
    Idle,
    Generating,
    Done,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub text: Option<String>,
    pub generation_state: GenerationStateView,
}

impl From<&Summary> for SummaryView {
    fn from(summary: &Summary) -> Self {
        let generation_state = match summary.generation_state {
            GenerationState::Idle => GenerationStateView::Idle,
            GenerationState::Generating => GenerationStateView::Generating,
            GenerationState::Done => GenerationStateView::Done,
        };
        Self {
            text: summary.text.clone(),
            generation_state,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoleView {
    User,
    Assistant,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub id: Uuid,
    pub role: RoleView,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ConversationMessage> for MessageView {
    fn from(message: &ConversationMessage) -> Self {
        let role = match message.role {
            Role::User => RoleView::User,
            Role::Assistant => RoleView::Assistant,
        };
        Self {
            id: message.id,
            role,
            body: message.body.clone(),
            created_at: message.created_at,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseView {
    Empty,
    HasDocuments,
    Summarizing,
    Summarized,
}

impl From<SessionPhase> for PhaseView {
    fn from(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::Empty => Self::Empty,
            SessionPhase::HasDocuments => Self::HasDocuments,
            SessionPhase::Summarizing => Self::Summarizing,
            SessionPhase::Summarized => Self::Summarized,
        }
    }
}

/// Everything the presentation layer needs to render the page.
#[derive(Serialize, Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: PhaseView,
    pub documents: Vec<DocumentView>,
    pub ready_count: usize,
    pub summary: SummaryView,
    pub conversation: Vec<MessageView>,
    pub conversation_enabled: bool,
    pub response_pending: bool,
    pub suggested_questions: Vec<String>,
}

impl From<&SessionState> for SessionSnapshot {
    fn from(state: &SessionState) -> Self {
        let conversation_enabled = state.conversation_enabled();
        let suggested_questions = if conversation_enabled && state.conversation().is_empty() {
            SUGGESTED_QUESTIONS.iter().map(|q| q.to_string()).collect()
        } else {
            Vec::new()
        };
        Self {
            phase: state.phase().into(),
            documents: state.documents().iter().map(DocumentView::from).collect(),
            ready_count: state.ready_count(),
            summary: state.summary().into(),
            conversation: state.conversation().iter().map(MessageView::from).collect(),
            conversation_enabled,
            response_pending: state.is_response_pending(),
            suggested_questions,
        }
    }
}
