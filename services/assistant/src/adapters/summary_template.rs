//! services/assistant/src/adapters/summary_template.rs
//!
//! This module contains the simulated summarizer. It implements the
//! `SummaryGenerationService` port from the `core` crate with a fixed template
//! that only reports how many documents were analysed.

use async_trait::async_trait;
use records_assistant_core::ports::{PortResult, SummaryGenerationService};
use std::time::Duration;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct TemplateSummaryAdapter {
    latency: Duration,
}

impl TemplateSummaryAdapter {
    /// Creates a new `TemplateSummaryAdapter` that waits `latency` before answering.
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

//=========================================================================================
// `SummaryGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SummaryGenerationService for TemplateSummaryAdapter {
    async fn generate_summary(
        &self,
        combined_text: &str,
        document_count: usize,
    ) -> PortResult<String> {
        debug!(
            "Summarizing {} characters from {} document(s)",
            combined_text.len(),
            document_count
        );
        tokio::time::sleep(self.latency).await;
        Ok(render_summary(document_count))
    }
}

/// The summary narrative for `document_count` documents. Content-independent.
pub fn render_summary(document_count: usize) -> String {
    let noun = if document_count == 1 { "document" } else { "documents" };
    format!(
        "Based on the analysis of {document_count} medical {noun}, here is a comprehensive summary:

**Patient Overview:**
The documents indicate routine medical care with several key health indicators being monitored. The patient appears to be in generally good health with some areas requiring ongoing attention.

**Key Findings:**
• Regular vital signs monitoring shows stable readings
• Blood pressure and heart rate within normal ranges
• Routine lab work has been conducted with results pending review

**Recommendations:**
• Continue current medication regimen as prescribed
• Schedule follow-up appointment in 3-6 months
• Maintain healthy lifestyle habits including regular exercise

**Notes:**
This summary is generated for informational purposes. Please consult with your healthcare provider for personalized medical advice."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_mentions_the_document_count() {
        assert!(render_summary(1).starts_with("Based on the analysis of 1 medical document,"));
        assert!(render_summary(3).starts_with("Based on the analysis of 3 medical documents,"));
    }

    #[tokio::test]
    async fn summary_ignores_content() {
        let adapter = TemplateSummaryAdapter::new(Duration::ZERO);
        let a = adapter.generate_summary("glucose 90", 2).await.unwrap();
        let b = adapter.generate_summary("completely different", 2).await.unwrap();
        assert_eq!(a, b);
    }
}
