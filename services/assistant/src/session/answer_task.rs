//! services/assistant/src/session/answer_task.rs
//!
//! This module contains the asynchronous "worker" function responsible for
//! answering a single chat message.

use crate::session::{coordinator::Completion, state::AppState};
use records_assistant_core::session::AnswerRequest;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

pub async fn answer_process(
    app_state: Arc<AppState>,
    request: AnswerRequest,
    completions: UnboundedSender<Completion>,
) {
    let start_time = Instant::now();
    info!("Answering question: '{}'", request.question);

    let result = app_state
        .qa_adapter
        .answer_question(&request.question, &request.context)
        .await;
    info!("Answer took {:?}", start_time.elapsed());

    if completions
        .send(Completion::AnswerGenerated {
            epoch: request.epoch,
            result,
        })
        .is_err()
    {
        warn!("Session closed before the answer was delivered.");
    }
}
