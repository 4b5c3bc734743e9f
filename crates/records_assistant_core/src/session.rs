//! crates/records_assistant_core/src/session.rs
//!
//! The single owned state value of a records session and its transition functions.
//!
//! Every mutation of documents, summary, or conversation goes through one of the
//! methods below. Background work never touches this value directly: it receives a
//! request (`SummaryRequest`, `AnswerRequest`) and reports back through the
//! `finish_*`/`abort_*` transitions, tagged with the epoch it was started in.

use crate::domain::{
    ConversationMessage, DocumentStatus, GenerationState, IncomingFile, Role, Summary,
    UploadedDocument,
};
use uuid::Uuid;

/// Placed between the texts of consecutive ready documents.
pub const DOCUMENT_SEPARATOR: &str = "\n\n---\n\n";

/// Rejections of session operations whose preconditions do not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Please upload at least one document first")]
    NoReadyDocuments,
    #[error("A summary is already being generated")]
    SummaryInFlight,
    #[error("Generate a summary before asking questions")]
    ConversationDisabled,
    #[error("Still answering the previous question")]
    ResponseInFlight,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Session is closed")]
    Closed,
}

/// Coarse lifecycle position, derived from the state rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    HasDocuments,
    Summarizing,
    Summarized,
}

/// What `remove_document` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    NotFound,
    Removed,
    /// The removed document was the last one; summary and conversation were cleared.
    RemovedLast,
}

/// Input handed to the summary task.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub epoch: u64,
    pub combined_text: String,
    pub document_count: usize,
}

/// Input handed to the answering task.
#[derive(Debug, Clone)]
pub struct AnswerRequest {
    pub epoch: u64,
    pub question: String,
    pub context: String,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    documents: Vec<UploadedDocument>,
    summary: Summary,
    conversation: Vec<ConversationMessage>,
    response_pending: bool,
    // Bumped whenever the document list empties, so late completions can be told apart.
    epoch: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[UploadedDocument] {
        &self.documents
    }

    pub fn document(&self, id: Uuid) -> Option<&UploadedDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn conversation(&self) -> &[ConversationMessage] {
        &self.conversation
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_response_pending(&self) -> bool {
        self.response_pending
    }

    pub fn ready_count(&self) -> usize {
        self.documents.iter().filter(|d| d.is_ready()).count()
    }

    /// The conversation is usable only once a summary text exists.
    pub fn conversation_enabled(&self) -> bool {
        self.summary.has_text()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.documents.is_empty() {
            SessionPhase::Empty
        } else if self.summary.generation_state == GenerationState::Generating {
            SessionPhase::Summarizing
        } else if self.summary.has_text() {
            SessionPhase::Summarized
        } else {
            SessionPhase::HasDocuments
        }
    }

    /// Checks the cross-field invariants of the session.
    pub fn invariants_hold(&self) -> bool {
        let summary_consistent = match self.summary.generation_state {
            GenerationState::Idle | GenerationState::Generating => !self.summary.has_text(),
            GenerationState::Done => self.summary.has_text(),
        };
        let documents_consistent = self.documents.iter().all(|d| {
            (d.status == DocumentStatus::Ready) == d.extracted_text.is_some()
        });
        let empty_consistent = !self.documents.is_empty()
            || (self.summary.generation_state == GenerationState::Idle
                && !self.summary.has_text()
                && self.conversation.is_empty()
                && !self.response_pending);
        summary_consistent && documents_consistent && empty_consistent
    }

    //-------------------------------------------------------------------------------------
    // Documents
    //-------------------------------------------------------------------------------------

    /// Appends one pending document per file, preserving batch order.
    pub fn ingest(&mut self, files: &[IncomingFile]) -> Vec<UploadedDocument> {
        let added: Vec<UploadedDocument> = files.iter().map(UploadedDocument::pending).collect();
        self.documents.extend(added.iter().cloned());
        debug_assert!(self.invariants_hold());
        added
    }

    /// Settles a pending document as ready. Returns `false` if the document is gone
    /// or was already settled.
    pub fn mark_ready(&mut self, id: Uuid, text: String) -> bool {
        match self.pending_document_mut(id) {
            Some(doc) => {
                doc.status = DocumentStatus::Ready;
                doc.extracted_text = Some(text);
                true
            }
            None => false,
        }
    }

    /// Settles a pending document as failed. Same return contract as `mark_ready`.
    pub fn mark_failed(&mut self, id: Uuid) -> bool {
        match self.pending_document_mut(id) {
            Some(doc) => {
                doc.status = DocumentStatus::Failed;
                true
            }
            None => false,
        }
    }

    fn pending_document_mut(&mut self, id: Uuid) -> Option<&mut UploadedDocument> {
        self.documents
            .iter_mut()
            .find(|d| d.id == id && d.status == DocumentStatus::Pending)
    }

    pub fn remove_document(&mut self, id: Uuid) -> Removal {
        let Some(index) = self.documents.iter().position(|d| d.id == id) else {
            return Removal::NotFound;
        };
        self.documents.remove(index);
        if !self.documents.is_empty() {
            return Removal::Removed;
        }

        self.summary = Summary::default();
        self.conversation.clear();
        self.response_pending = false;
        self.epoch += 1;
        debug_assert!(self.invariants_hold());
        Removal::RemovedLast
    }

    /// Ready documents' text in upload order, joined with `DOCUMENT_SEPARATOR`.
    pub fn combined_ready_text(&self) -> String {
        self.documents
            .iter()
            .filter_map(|d| d.extracted_text.as_deref())
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR)
    }

    //-------------------------------------------------------------------------------------
    // Summary
    //-------------------------------------------------------------------------------------

    /// Moves the summary to `Generating` and returns the work to hand to the summarizer.
    /// Any previous summary text is dropped, so it is refused while an answer grounded
    /// on that text is still pending.
    pub fn begin_summary(&mut self) -> Result<SummaryRequest, SessionError> {
        if self.summary.generation_state == GenerationState::Generating {
            return Err(SessionError::SummaryInFlight);
        }
        if self.response_pending {
            return Err(SessionError::ResponseInFlight);
        }
        let document_count = self.ready_count();
        if document_count == 0 {
            return Err(SessionError::NoReadyDocuments);
        }

        self.summary = Summary {
            text: None,
            generation_state: GenerationState::Generating,
        };
        debug_assert!(self.invariants_hold());
        Ok(SummaryRequest {
            epoch: self.epoch,
            combined_text: self.combined_ready_text(),
            document_count,
        })
    }

    pub fn finish_summary(&mut self, epoch: u64, text: String) -> bool {
        if !self.summary_in_flight_for(epoch) {
            return false;
        }
        self.summary = Summary {
            text: Some(text),
            generation_state: GenerationState::Done,
        };
        debug_assert!(self.invariants_hold());
        true
    }

    /// Returns a failed generation to `Idle` with no text.
    pub fn abort_summary(&mut self, epoch: u64) -> bool {
        if !self.summary_in_flight_for(epoch) {
            return false;
        }
        self.summary = Summary::default();
        true
    }

    fn summary_in_flight_for(&self, epoch: u64) -> bool {
        epoch == self.epoch && self.summary.generation_state == GenerationState::Generating
    }

    //-------------------------------------------------------------------------------------
    // Conversation
    //-------------------------------------------------------------------------------------

    /// Appends the user's message and returns it with the work for the answering task.
    pub fn begin_message(
        &mut self,
        body: &str,
    ) -> Result<(ConversationMessage, AnswerRequest), SessionError> {
        let Some(context) = self.summary.text.clone() else {
            return Err(SessionError::ConversationDisabled);
        };
        if self.response_pending {
            return Err(SessionError::ResponseInFlight);
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let message = ConversationMessage::new(Role::User, body);
        self.conversation.push(message.clone());
        self.response_pending = true;
        Ok((
            message,
            AnswerRequest {
                epoch: self.epoch,
                question: body.to_string(),
                context,
            },
        ))
    }

    pub fn finish_message(&mut self, epoch: u64, body: String) -> Option<ConversationMessage> {
        if epoch != self.epoch || !self.response_pending {
            return None;
        }
        let message = ConversationMessage::new(Role::Assistant, body);
        self.conversation.push(message.clone());
        self.response_pending = false;
        Some(message)
    }

    /// Clears the pending flag after a failed answer. The user message stays.
    pub fn abort_message(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || !self.response_pending {
            return false;
        }
        self.response_pending = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<IncomingFile> {
        names
            .iter()
            .map(|n| IncomingFile::from_bytes(*n, format!("contents of {n}")))
            .collect()
    }

    fn summarized_session() -> SessionState {
        let mut state = SessionState::new();
        let docs = state.ingest(&files(&["a.txt"]));
        state.mark_ready(docs[0].id, "blood pressure 120/80".to_string());
        let request = state.begin_summary().unwrap();
        state.finish_summary(request.epoch, "summary".to_string());
        state
    }

    #[test]
    fn ingest_returns_pending_documents_in_batch_order() {
        let mut state = SessionState::new();
        let added = state.ingest(&files(&["one.txt", "two.pdf", "three.doc"]));

        let names: Vec<_> = added.iter().map(|d| d.source_name.as_str()).collect();
        assert_eq!(names, ["one.txt", "two.pdf", "three.doc"]);
        assert!(added.iter().all(|d| d.status == DocumentStatus::Pending));
        assert_eq!(state.documents().len(), 3);
        assert_eq!(state.phase(), SessionPhase::HasDocuments);
    }

    #[test]
    fn read_outcome_settles_a_document_exactly_once() {
        let mut state = SessionState::new();
        let id = state.ingest(&files(&["a.txt"]))[0].id;

        assert!(state.mark_ready(id, "text".to_string()));
        assert!(!state.mark_failed(id));
        assert!(!state.mark_ready(id, "other".to_string()));

        let doc = state.document(id).unwrap();
        assert_eq!(doc.status, DocumentStatus::Ready);
        assert_eq!(doc.extracted_text.as_deref(), Some("text"));
        assert!(state.invariants_hold());
    }

    #[test]
    fn failed_read_leaves_siblings_alone() {
        let mut state = SessionState::new();
        let added = state.ingest(&files(&["a.txt", "b.txt"]));

        assert!(state.mark_failed(added[0].id));
        assert!(state.mark_ready(added[1].id, "fine".to_string()));

        assert_eq!(state.documents()[0].status, DocumentStatus::Failed);
        assert!(state.documents()[0].extracted_text.is_none());
        assert_eq!(state.ready_count(), 1);
    }

    #[test]
    fn read_outcome_for_removed_document_is_ignored() {
        let mut state = SessionState::new();
        let added = state.ingest(&files(&["a.txt", "b.txt"]));
        state.remove_document(added[0].id);

        assert!(!state.mark_ready(added[0].id, "late".to_string()));
        assert_eq!(state.documents().len(), 1);
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let mut state = SessionState::new();
        state.ingest(&files(&["a.txt"]));

        assert_eq!(state.remove_document(Uuid::new_v4()), Removal::NotFound);
        assert_eq!(state.documents().len(), 1);
    }

    #[test]
    fn removing_last_document_clears_summary_and_conversation() {
        let mut state = summarized_session();
        state.begin_message("what labs were taken?").unwrap();
        let epoch = state.epoch();
        let id = state.documents()[0].id;

        assert_eq!(state.remove_document(id), Removal::RemovedLast);

        assert_eq!(state.phase(), SessionPhase::Empty);
        assert!(state.summary().text.is_none());
        assert_eq!(state.summary().generation_state, GenerationState::Idle);
        assert!(state.conversation().is_empty());
        assert!(!state.is_response_pending());
        assert_eq!(state.epoch(), epoch + 1);
        assert!(state.invariants_hold());
    }

    #[test]
    fn removing_one_of_several_keeps_summary() {
        let mut state = summarized_session();
        let extra = state.ingest(&files(&["b.txt"]))[0].id;

        assert_eq!(state.remove_document(extra), Removal::Removed);
        assert_eq!(state.phase(), SessionPhase::Summarized);
    }

    #[test]
    fn summary_without_ready_documents_is_rejected_without_state_change() {
        let mut state = SessionState::new();
        state.ingest(&files(&["pending.txt"]));

        assert_eq!(state.begin_summary().unwrap_err(), SessionError::NoReadyDocuments);
        assert_eq!(state.summary().generation_state, GenerationState::Idle);
        assert!(state.summary().text.is_none());
    }

    #[test]
    fn summary_lifecycle_moves_idle_generating_done() {
        let mut state = SessionState::new();
        let added = state.ingest(&files(&["a.txt", "b.txt", "c.txt"]));
        state.mark_ready(added[0].id, "first".to_string());
        state.mark_failed(added[1].id);
        state.mark_ready(added[2].id, "third".to_string());

        let request = state.begin_summary().unwrap();
        assert_eq!(request.document_count, 2);
        assert_eq!(request.combined_text, "first\n\n---\n\nthird");
        assert_eq!(state.phase(), SessionPhase::Summarizing);
        assert!(state.summary().text.is_none());
        assert!(!state.conversation_enabled());

        assert!(state.finish_summary(request.epoch, "done".to_string()));
        assert_eq!(state.summary().generation_state, GenerationState::Done);
        assert_eq!(state.phase(), SessionPhase::Summarized);
        assert!(state.conversation_enabled());
    }

    #[test]
    fn overlapping_summary_is_rejected() {
        let mut state = SessionState::new();
        let id = state.ingest(&files(&["a.txt"]))[0].id;
        state.mark_ready(id, "x".to_string());

        state.begin_summary().unwrap();
        assert_eq!(state.begin_summary().unwrap_err(), SessionError::SummaryInFlight);
    }

    #[test]
    fn summary_waits_for_the_pending_answer() {
        let mut state = summarized_session();
        let (_, answer) = state.begin_message("any labs?").unwrap();

        assert_eq!(state.begin_summary().unwrap_err(), SessionError::ResponseInFlight);
        assert_eq!(state.summary().text.as_deref(), Some("summary"));
        assert!(state.conversation_enabled());

        state.finish_message(answer.epoch, "answer".to_string()).unwrap();
        assert!(state.begin_summary().is_ok());
        assert!(state.invariants_hold());
    }

    #[test]
    fn stale_summary_cannot_resurrect_after_reset() {
        let mut state = SessionState::new();
        let id = state.ingest(&files(&["a.txt"]))[0].id;
        state.mark_ready(id, "x".to_string());
        let request = state.begin_summary().unwrap();

        state.remove_document(id);
        state.ingest(&files(&["b.txt"]));

        assert!(!state.finish_summary(request.epoch, "stale".to_string()));
        assert!(state.summary().text.is_none());
        assert_eq!(state.summary().generation_state, GenerationState::Idle);
    }

    #[test]
    fn aborted_summary_returns_to_idle() {
        let mut state = SessionState::new();
        let id = state.ingest(&files(&["a.txt"]))[0].id;
        state.mark_ready(id, "x".to_string());
        let request = state.begin_summary().unwrap();

        assert!(state.abort_summary(request.epoch));
        assert_eq!(state.summary().generation_state, GenerationState::Idle);
        assert_eq!(state.phase(), SessionPhase::HasDocuments);
    }

    #[test]
    fn message_rejected_while_conversation_disabled() {
        let mut state = SessionState::new();
        state.ingest(&files(&["a.txt"]));

        assert_eq!(
            state.begin_message("hello").unwrap_err(),
            SessionError::ConversationDisabled
        );
        assert!(state.conversation().is_empty());
    }

    #[test]
    fn blank_message_is_rejected() {
        let mut state = summarized_session();
        assert_eq!(state.begin_message("   ").unwrap_err(), SessionError::EmptyMessage);
        assert!(state.conversation().is_empty());
    }

    #[test]
    fn message_round_trip_appends_user_then_assistant() {
        let mut state = summarized_session();

        let (user, request) = state.begin_message("  any labs?  ").unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.body, "any labs?");
        assert_eq!(request.question, "any labs?");
        assert_eq!(request.context, "summary");
        assert_eq!(
            state.begin_message("again").unwrap_err(),
            SessionError::ResponseInFlight
        );

        let reply = state.finish_message(request.epoch, "answer".to_string()).unwrap();
        assert_eq!(reply.role, Role::Assistant);

        let roles: Vec<_> = state.conversation().iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant]);
        assert!(!state.is_response_pending());
    }

    #[test]
    fn aborted_message_keeps_the_question() {
        let mut state = summarized_session();
        let (_, request) = state.begin_message("question").unwrap();

        assert!(state.abort_message(request.epoch));
        assert_eq!(state.conversation().len(), 1);
        assert!(!state.is_response_pending());
    }
}
