//! services/assistant/src/session/read_task.rs
//!
//! The per-document worker: reads one ingested file and reports the outcome.

use crate::session::{coordinator::Completion, state::AppState};
use records_assistant_core::domain::IncomingFile;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use uuid::Uuid;

/// Reads `file` and sends the result for `document_id` back to the coordinator.
///
/// Runs to completion; there is no cancellation and no retry.
pub async fn read_process(
    app_state: Arc<AppState>,
    document_id: Uuid,
    file: IncomingFile,
    completions: UnboundedSender<Completion>,
) {
    let result = app_state.reader.read_text(&file).await;
    match &result {
        Ok(text) => info!("Read '{}' ({} chars).", file.name, text.len()),
        Err(e) => warn!("Failed to read '{}': {}", file.name, e),
    }

    if completions
        .send(Completion::DocumentRead { document_id, result })
        .is_err()
    {
        warn!("Session closed before '{}' finished reading.", file.name);
    }
}
