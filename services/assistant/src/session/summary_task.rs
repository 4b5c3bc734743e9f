//! services/assistant/src/session/summary_task.rs
//!
//! The summary worker: one simulated-latency call to the summarizer.

use crate::session::{coordinator::Completion, state::AppState};
use records_assistant_core::session::SummaryRequest;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

pub async fn summary_process(
    app_state: Arc<AppState>,
    request: SummaryRequest,
    completions: UnboundedSender<Completion>,
) {
    let start_time = Instant::now();
    info!("Summary generation started for {} document(s).", request.document_count);

    let result = app_state
        .summary_adapter
        .generate_summary(&request.combined_text, request.document_count)
        .await;
    info!("Summary generation took {:?}", start_time.elapsed());

    if completions
        .send(Completion::SummaryGenerated {
            epoch: request.epoch,
            result,
        })
        .is_err()
    {
        warn!("Session closed before the summary was delivered.");
    }
}
