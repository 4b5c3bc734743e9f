//! services/assistant/src/session/state.rs
//!
//! Defines the shared application state: configuration and the adapters behind
//! each core port.

use crate::adapters::{KeywordQaAdapter, TemplateSummaryAdapter, TextFileReader};
use crate::config::Config;
use records_assistant_core::ports::{
    DocumentReader, QuestionAnsweringService, SummaryGenerationService,
};
use std::sync::Arc;

/// Created once at startup and shared by the coordinator and its tasks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub reader: Arc<dyn DocumentReader>,
    pub summary_adapter: Arc<dyn SummaryGenerationService>,
    pub qa_adapter: Arc<dyn QuestionAnsweringService>,
}

impl AppState {
    /// Wires the simulated adapters using the latencies from `config`.
    pub fn simulated(config: Config) -> Self {
        let reader = Arc::new(TextFileReader::new());
        let summary_adapter = Arc::new(TemplateSummaryAdapter::new(config.summary_latency));
        let qa_adapter = Arc::new(KeywordQaAdapter::new(config.response_latency));
        Self {
            config: Arc::new(config),
            reader,
            summary_adapter,
            qa_adapter,
        }
    }
}
