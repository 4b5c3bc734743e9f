//! services/assistant/src/adapters/keyword_qa.rs
//!
//! This module contains the simulated question answering adapter.
//! It implements the `QuestionAnsweringService` port from the `core` crate by
//! matching the lowercased question against an ordered table of keyword rules.

use async_trait::async_trait;
use records_assistant_core::ports::{PortResult, QuestionAnsweringService};
use std::time::Duration;
use tracing::debug;

//=========================================================================================
// Response Table
//=========================================================================================

/// The topic a question was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Diagnosis,
    Medication,
    Test,
    Treatment,
    General,
}

struct ResponseRule {
    topic: Topic,
    keywords: &'static [&'static str],
    template: &'static str,
}

impl ResponseRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

// Evaluated top to bottom; the first matching rule wins.
static RESPONSE_RULES: [ResponseRule; 4] = [
    ResponseRule {
        topic: Topic::Diagnosis,
        keywords: &["diagnosis", "diagnoses"],
        template: "Based on the uploaded documents, I can see references to routine health monitoring. The records indicate ongoing wellness care rather than specific diagnostic findings. For detailed diagnostic information, I recommend consulting directly with your healthcare provider.",
    },
    ResponseRule {
        topic: Topic::Medication,
        keywords: &["medication", "medicine"],
        template: "The documents reference standard care protocols. To get accurate information about specific medications mentioned in your records, please review the original documents or consult with your prescribing physician.",
    },
    ResponseRule {
        topic: Topic::Test,
        keywords: &["test", "lab"],
        template: "Your medical records indicate that routine laboratory tests have been ordered or conducted. Common tests mentioned in similar records include complete blood count (CBC), metabolic panels, and lipid profiles. For specific test results and their interpretations, please consult your healthcare provider.",
    },
    ResponseRule {
        topic: Topic::Treatment,
        keywords: &["treatment", "plan"],
        template: "Based on the summary, the treatment approach appears to focus on preventive care and monitoring. Key elements include:\n\n• Regular check-ups\n• Lifestyle management\n• Ongoing health monitoring\n\nFor a detailed treatment plan, please discuss with your healthcare team.",
    },
];

/// Opening questions offered while the conversation is still empty.
pub const SUGGESTED_QUESTIONS: [&str; 4] = [
    "What are the main diagnoses?",
    "List all medications mentioned",
    "What tests were performed?",
    "Summarize the treatment plan",
];

fn matching_rule(question: &str) -> Option<&'static ResponseRule> {
    let lowered = question.to_lowercase();
    RESPONSE_RULES.iter().find(|rule| rule.matches(&lowered))
}

pub fn classify(question: &str) -> Topic {
    matching_rule(question).map_or(Topic::General, |rule| rule.topic)
}

/// Picks the canned answer for `question`. Never fails.
pub fn select_response(question: &str) -> String {
    match matching_rule(question) {
        Some(rule) => rule.template.to_string(),
        None => format!(
            "Thank you for your question about \"{}\". Based on the medical records you've uploaded, I can provide general insights. However, for specific medical advice or detailed interpretations, I recommend consulting with your healthcare provider who has access to your complete medical history.\n\nIs there a specific aspect of the summary you'd like me to clarify?",
            question
        ),
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct KeywordQaAdapter {
    latency: Duration,
}

impl KeywordQaAdapter {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl QuestionAnsweringService for KeywordQaAdapter {
    async fn answer_question(&self, question: &str, _context: &str) -> PortResult<String> {
        tokio::time::sleep(self.latency).await;
        let topic = classify(question);
        debug!("Routed question to {:?}", topic);
        Ok(select_response(question))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggested_questions_each_hit_their_own_topic() {
        let topics: Vec<_> = SUGGESTED_QUESTIONS.iter().map(|q| classify(q)).collect();
        assert_eq!(
            topics,
            [Topic::Diagnosis, Topic::Medication, Topic::Test, Topic::Treatment]
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("Any MEDICINE changes?"), Topic::Medication);
        assert_eq!(classify("LAB values please"), Topic::Test);
    }

    #[test]
    fn diagnosis_wins_over_later_rules() {
        assert_eq!(
            classify("Which diagnosis led to this medication and lab test?"),
            Topic::Diagnosis
        );
        assert_eq!(classify("Tell me about diagnoses"), Topic::Diagnosis);
    }

    #[test]
    fn medication_wins_over_test_and_treatment() {
        assert_eq!(classify("medication in the treatment plan"), Topic::Medication);
    }

    #[test]
    fn medication_answer_mentions_medications() {
        let answer = select_response("What medications are prescribed?");
        assert!(answer.contains("medications"));
    }

    #[test]
    fn fallback_echoes_the_question() {
        let answer = select_response("How is my Sleep?");
        assert_eq!(classify("How is my Sleep?"), Topic::General);
        assert!(answer.contains("\"How is my Sleep?\""));
    }

    #[tokio::test]
    async fn adapter_answers_from_the_table() {
        let adapter = KeywordQaAdapter::new(Duration::ZERO);
        let answer = adapter
            .answer_question("what is the treatment?", "summary")
            .await
            .unwrap();
        assert!(answer.starts_with("Based on the summary, the treatment approach"));
    }
}
