//! services/assistant/src/session/coordinator.rs
//!
//! The session coordinator: the only thing allowed to change a session.
//!
//! Operations called by the presentation layer apply their transition right away
//! and spawn any slow work as an independent task. Tasks never touch the state;
//! they send a `Completion` back over a channel, and a single apply loop turns
//! each completion into the matching transition. Every change is published as a
//! `SessionEvent`.

use crate::session::{
    answer_task::answer_process,
    protocol::{DocumentView, MessageView, NoticeLevel, SessionEvent, SessionSnapshot},
    read_task::read_process,
    state::AppState,
    summary_task::summary_process,
};
use records_assistant_core::{
    domain::{ConversationMessage, IncomingFile, UploadedDocument},
    ports::PortResult,
    session::{Removal, SessionError, SessionState},
};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 256;

const SUMMARY_READY_NOTICE: &str = "Summary generated successfully!";
const SUMMARY_FAILED_NOTICE: &str = "Failed to generate summary. Please try again.";
const ANSWER_FAILED_NOTICE: &str = "Failed to get response. Please try again.";

/// The outcome of a background task, reported back to the apply loop.
#[derive(Debug)]
pub enum Completion {
    DocumentRead {
        document_id: Uuid,
        result: PortResult<String>,
    },
    SummaryGenerated {
        epoch: u64,
        result: PortResult<String>,
    },
    AnswerGenerated {
        epoch: u64,
        result: PortResult<String>,
    },
}

pub struct SessionCoordinator {
    app_state: Arc<AppState>,
    state: Arc<Mutex<SessionState>>,
    completions: mpsc::UnboundedSender<Completion>,
    events: broadcast::Sender<SessionEvent>,
    /// Stops the apply loop when the session is discarded.
    cancellation_token: CancellationToken,
}

impl SessionCoordinator {
    /// Creates an empty session and spawns its apply loop. Must be called from
    /// within a Tokio runtime.
    pub fn start(app_state: Arc<AppState>) -> Self {
        let state = Arc::new(Mutex::new(SessionState::new()));
        let (completions, receiver) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let cancellation_token = CancellationToken::new();

        tokio::spawn(apply_loop(
            state.clone(),
            receiver,
            events.clone(),
            cancellation_token.clone(),
        ));
        info!("Session started.");

        Self {
            app_state,
            state,
            completions,
            events,
            cancellation_token,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&*self.state.lock().await)
    }

    /// Accepts a batch of files. Returns one pending document per file, in batch
    /// order, and starts an independent read for each.
    pub async fn ingest_files(
        &self,
        batch: Vec<IncomingFile>,
    ) -> Result<Vec<UploadedDocument>, SessionError> {
        self.ensure_open()?;
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut state = self.state.lock().await;
        let added = state.ingest(&batch);
        info!("Ingested {} file(s).", added.len());
        publish(
            &self.events,
            SessionEvent::DocumentsAdded {
                documents: added.iter().map(DocumentView::from).collect(),
            },
        );
        drop(state);

        for (document, file) in added.iter().zip(batch) {
            tokio::spawn(read_process(
                self.app_state.clone(),
                document.id,
                file,
                self.completions.clone(),
            ));
        }
        Ok(added)
    }

    /// Removes a document. Unknown ids are ignored. Removing the last document
    /// returns the session to empty.
    pub async fn remove_document(&self, document_id: Uuid) -> Removal {
        let mut state = self.state.lock().await;
        let removal = state.remove_document(document_id);
        match removal {
            Removal::NotFound => {
                debug!("Ignoring removal of unknown document {}", document_id);
            }
            Removal::Removed => {
                info!("Removed document {}", document_id);
                publish(&self.events, SessionEvent::DocumentRemoved { document_id });
            }
            Removal::RemovedLast => {
                info!("Removed last document {}; session cleared.", document_id);
                publish(&self.events, SessionEvent::DocumentRemoved { document_id });
                publish(&self.events, SessionEvent::SessionCleared);
            }
        }
        removal
    }

    /// Starts summary generation over the ready documents.
    ///
    /// Without any ready document this is rejected, a notice is published, and
    /// nothing changes.
    pub async fn generate_summary(&self) -> Result<(), SessionError> {
        self.ensure_open()?;
        let mut state = self.state.lock().await;
        let request = match state.begin_summary() {
            Ok(request) => request,
            Err(e) => {
                warn!("Summary request rejected: {}", e);
                if e == SessionError::NoReadyDocuments {
                    publish(
                        &self.events,
                        SessionEvent::Notice {
                            level: NoticeLevel::Error,
                            message: e.to_string(),
                        },
                    );
                }
                return Err(e);
            }
        };
        publish(
            &self.events,
            SessionEvent::SummaryUpdated {
                summary: state.summary().into(),
            },
        );
        drop(state);

        tokio::spawn(summary_process(
            self.app_state.clone(),
            request,
            self.completions.clone(),
        ));
        Ok(())
    }

    /// Appends the user's message and starts answering it.
    pub async fn send_message(&self, body: &str) -> Result<ConversationMessage, SessionError> {
        self.ensure_open()?;
        let mut state = self.state.lock().await;
        let (message, request) = match state.begin_message(body) {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Message rejected: {}", e);
                return Err(e);
            }
        };
        publish(
            &self.events,
            SessionEvent::MessageAppended {
                message: MessageView::from(&message),
            },
        );
        publish(&self.events, SessionEvent::AnsweringStarted);
        drop(state);

        tokio::spawn(answer_process(
            self.app_state.clone(),
            request,
            self.completions.clone(),
        ));
        Ok(message)
    }

    /// Discards the session. Tasks still running finish, but their results are
    /// dropped, and operations that would start new work return `Closed`.
    pub fn shutdown(&self) {
        self.cancellation_token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    // Nothing would apply the completion of work started after shutdown.
    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.is_closed() {
            warn!("Operation rejected: session is closed.");
            return Err(SessionError::Closed);
        }
        Ok(())
    }
}

impl Drop for SessionCoordinator {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

fn publish(events: &broadcast::Sender<SessionEvent>, event: SessionEvent) {
    // No subscribers is fine; the snapshot still reflects the change.
    let _ = events.send(event);
}

//=========================================================================================
// Apply Loop
//=========================================================================================

async fn apply_loop(
    state: Arc<Mutex<SessionState>>,
    mut receiver: mpsc::UnboundedReceiver<Completion>,
    events: broadcast::Sender<SessionEvent>,
    cancellation_token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Session closed.");
                break;
            }
            completion = receiver.recv() => match completion {
                Some(completion) => apply_completion(&state, &events, completion).await,
                None => break,
            },
        }
    }
}

async fn apply_completion(
    state: &Mutex<SessionState>,
    events: &broadcast::Sender<SessionEvent>,
    completion: Completion,
) {
    let mut state = state.lock().await;
    match completion {
        Completion::DocumentRead { document_id, result } => {
            let settled = match result {
                Ok(text) => state.mark_ready(document_id, text),
                Err(_) => state.mark_failed(document_id),
            };
            if !settled {
                debug!("Dropping read result for removed document {}", document_id);
                return;
            }
            if let Some(document) = state.document(document_id) {
                publish(
                    events,
                    SessionEvent::DocumentUpdated {
                        document: document.into(),
                    },
                );
            }
        }

        Completion::SummaryGenerated { epoch, result } => match result {
            Ok(text) => {
                if !state.finish_summary(epoch, text) {
                    debug!("Dropping stale summary from epoch {}", epoch);
                    return;
                }
                info!("Summary ready.");
                publish(
                    events,
                    SessionEvent::SummaryUpdated {
                        summary: state.summary().into(),
                    },
                );
                publish(
                    events,
                    SessionEvent::Notice {
                        level: NoticeLevel::Success,
                        message: SUMMARY_READY_NOTICE.to_string(),
                    },
                );
            }
            Err(e) => {
                error!("Summary generation failed: {}", e);
                if state.abort_summary(epoch) {
                    publish(
                        events,
                        SessionEvent::SummaryUpdated {
                            summary: state.summary().into(),
                        },
                    );
                    publish(
                        events,
                        SessionEvent::Notice {
                            level: NoticeLevel::Error,
                            message: SUMMARY_FAILED_NOTICE.to_string(),
                        },
                    );
                }
            }
        },

        Completion::AnswerGenerated { epoch, result } => match result {
            Ok(body) => match state.finish_message(epoch, body) {
                Some(message) => {
                    publish(
                        events,
                        SessionEvent::MessageAppended {
                            message: MessageView::from(&message),
                        },
                    );
                    publish(events, SessionEvent::AnsweringEnded);
                }
                None => debug!("Dropping stale answer from epoch {}", epoch),
            },
            Err(e) => {
                error!("Answering failed: {}", e);
                if state.abort_message(epoch) {
                    publish(events, SessionEvent::AnsweringEnded);
                    publish(
                        events,
                        SessionEvent::Notice {
                            level: NoticeLevel::Error,
                            message: ANSWER_FAILED_NOTICE.to_string(),
                        },
                    );
                }
            }
        },
    }
}
