// Answer Generator: grounded prompt -> completion -> answer + confidence
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::Result;
use crate::llm::LanguageModel;
use crate::rag::parser::{ParseOutcome, ParseStatus};
use crate::rag::prompt::grounded_prompt;
use crate::rag::retrieval::ContextSet;
use crate::rag::with_deadline;

/// Parsed generator output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    pub answer: String,
    pub confidence_score: f64,
    pub parse_status: ParseStatus,
}

impl From<ParseOutcome> for GeneratedAnswer {
    fn from(outcome: ParseOutcome) -> Self {
        let confidence_score = outcome.score();
        let parse_status = outcome.status();
        Self {
            answer: outcome.into_answer(),
            confidence_score,
            parse_status,
        }
    }
}

pub struct AnswerGenerator {
    llm: Arc<dyn LanguageModel>,
    timeout: Duration,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn LanguageModel>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// One model call. Only the call itself can fail; parsing always
    /// yields an answer.
    pub async fn generate(&self, question: &str, context: &ContextSet) -> Result<GeneratedAnswer> {
        let prompt = grounded_prompt(question, context);
        let response = with_deadline("answer generation", self.timeout, self.llm.complete(&prompt)).await?;

        let outcome = ParseOutcome::parse(&response);
        if outcome.status() != ParseStatus::Parsed {
            tracing::debug!(status = ?outcome.status(), "model response did not follow the answer format");
        }

        Ok(outcome.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RagError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a fixed completion and remembers the last prompt
    struct CannedModel {
        reply: std::result::Result<String, String>,
        last_prompt: Mutex<Option<String>>,
    }

    impl CannedModel {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                last_prompt: Mutex::new(None),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn complete(&self, prompt: &str) -> Result<String> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            self.reply.clone().map_err(RagError::LanguageModel)
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    fn context() -> ContextSet {
        ContextSet::new(vec!["Agents break work into subtasks.".to_string()])
    }

    #[tokio::test]
    async fn test_generate_parses_markers() {
        let model = Arc::new(CannedModel::replying("Answer: Splitting work.\nScore: 0.9"));
        let generator = AnswerGenerator::new(model.clone(), Duration::from_secs(5));

        let answer = generator.generate("What is decomposition?", &context()).await.unwrap();
        assert_eq!(answer.answer, "Splitting work.");
        assert_eq!(answer.confidence_score, 0.9);
        assert_eq!(answer.parse_status, ParseStatus::Parsed);

        let prompt = model.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Agents break work into subtasks."));
        assert!(prompt.contains("What is decomposition?"));
    }

    #[tokio::test]
    async fn test_generate_tri_state_fallbacks() {
        let cases = [
            ("free text only", 0.0, ParseStatus::NoMarkers),
            ("Answer: x\nScore: n/a", 0.5, ParseStatus::MalformedScore),
            ("Answer: x\nScore: 0.0", 0.0, ParseStatus::Parsed),
        ];

        for (reply, score, status) in cases {
            let generator =
                AnswerGenerator::new(Arc::new(CannedModel::replying(reply)), Duration::from_secs(5));
            let answer = generator.generate("q", &context()).await.unwrap();
            assert_eq!(answer.confidence_score, score, "reply: {}", reply);
            assert_eq!(answer.parse_status, status, "reply: {}", reply);
        }
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let generator =
            AnswerGenerator::new(Arc::new(CannedModel::failing("HTTP 503")), Duration::from_secs(5));
        let err = generator.generate("q", &context()).await.unwrap_err();
        assert!(matches!(err, RagError::LanguageModel(_)));
    }
}
