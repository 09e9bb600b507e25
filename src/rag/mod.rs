// Retrieval-augmented answer pipeline
//
// Two stages run in strict sequence for every question:
// - Retrieval: question (+ model-generated variants) -> deduplicated context
// - Generation: grounded prompt -> model completion -> answer + confidence
//
// Components:
// - Query Expander: alternative search phrasings from the model
// - Context Retriever: multi-query search, merge, dedup, cap
// - Prompt: strict grounding template
// - Parser: tolerant Answer:/Score: extraction with named outcomes
// - Answer Generator: prompt -> completion -> parsed answer
// - Pipeline: typed state threaded through both stages

pub mod expander;
pub mod generator;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod retrieval;
pub mod state;

use std::future::Future;
use std::time::Duration;

use crate::errors::{RagError, Result};

// Re-export key types
pub use expander::QueryExpander;
pub use generator::{AnswerGenerator, GeneratedAnswer};
pub use parser::{ParseOutcome, ParseStatus};
pub use pipeline::{ExpansionFailure, PipelineConfig, RagPipeline};
pub use retrieval::{ContextRetriever, ContextSet};
pub use state::{AnswerRecord, PipelineInput, PipelineState};

/// Run an external call under a deadline; expiry is pipeline-fatal
pub async fn with_deadline<T, F>(operation: &str, limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(RagError::Timeout {
            operation: operation.to_string(),
            duration_ms: limit.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_passes_result_through() {
        let value = with_deadline("noop", Duration::from_secs(1), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_timeout() {
        let result: Result<()> = with_deadline("slow call", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        match result {
            Err(RagError::Timeout { operation, duration_ms }) => {
                assert_eq!(operation, "slow call");
                assert_eq!(duration_ms, 10);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
