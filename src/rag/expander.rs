// Query expansion: one question -> several alternative search phrasings
use std::sync::Arc;
use std::time::Duration;

use crate::errors::Result;
use crate::llm::LanguageModel;
use crate::rag::with_deadline;

/// Number of alternative phrasings requested by default
pub const DEFAULT_EXPANSIONS: usize = 3;

/// Asks the language model for alternative search terms
pub struct QueryExpander {
    llm: Arc<dyn LanguageModel>,
    count: usize,
    timeout: Duration,
}

impl QueryExpander {
    pub fn new(llm: Arc<dyn LanguageModel>, count: usize, timeout: Duration) -> Self {
        Self {
            llm,
            count,
            timeout,
        }
    }

    /// Instruction prompt sent to the model
    pub fn prompt(&self, question: &str) -> String {
        format!(
            "Provide exactly {} alternative search terms for: '{}'. \
             Output only the terms, one per line, with no numbering or extra commentary.",
            self.count, question
        )
    }

    /// One model call; returns up to `count` non-empty, trimmed lines.
    /// Model failures propagate; the caller decides whether to degrade.
    pub async fn expand(&self, question: &str) -> Result<Vec<String>> {
        let prompt = self.prompt(question);
        let response = with_deadline("query expansion", self.timeout, self.llm.complete(&prompt)).await?;

        let terms = parse_expansions(&response, self.count);
        tracing::debug!(count = terms.len(), ?terms, "query expansions");
        Ok(terms)
    }
}

/// Split a model response into search terms: one per line, trimmed, blanks dropped
pub fn parse_expansions(response: &str, limit: usize) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(limit)
        .map(str::to_string)
        .collect()
}
