// Context Retriever: gathers a deduplicated, bounded set of context chunks
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::Result;
use crate::index::VectorIndex;
use crate::rag::expander::QueryExpander;
use crate::rag::pipeline::ExpansionFailure;
use crate::rag::with_deadline;

/// Search parameters for retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalParams {
    /// Nearest neighbours requested per query
    pub top_k: usize,
    /// Maximum chunks kept after merging (None = unbounded)
    pub max_context_chunks: Option<usize>,
    /// Drop repeated chunk texts across queries
    pub deduplicate: bool,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_context_chunks: Some(6),
            deduplicate: true,
        }
    }
}

/// Ordered chunk texts handed to the generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextSet(Vec<String>);

impl ContextSet {
    pub fn new(chunks: Vec<String>) -> Self {
        Self(chunks)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for ContextSet {
    fn from(chunks: Vec<String>) -> Self {
        Self(chunks)
    }
}

/// Merge per-query results (already concatenated in query order).
/// Dedup keeps the first occurrence of each exact text; the cap applies after.
pub fn merge_chunks(
    chunks: Vec<String>,
    deduplicate: bool,
    max_chunks: Option<usize>,
) -> ContextSet {
    let mut merged = if deduplicate {
        let mut seen = HashSet::new();
        chunks
            .into_iter()
            .filter(|text| seen.insert(text.clone()))
            .collect::<Vec<_>>()
    } else {
        chunks
    };

    if let Some(cap) = max_chunks {
        merged.truncate(cap);
    }

    ContextSet(merged)
}

/// Retrieval stage of the pipeline
pub struct ContextRetriever {
    index: Arc<dyn VectorIndex>,
    expander: Option<QueryExpander>,
    params: RetrievalParams,
    on_expansion_error: ExpansionFailure,
    search_timeout: Duration,
}

impl ContextRetriever {
    /// Retriever that searches with the question only
    pub fn new(index: Arc<dyn VectorIndex>, params: RetrievalParams, search_timeout: Duration) -> Self {
        Self {
            index,
            expander: None,
            params,
            on_expansion_error: ExpansionFailure::Abort,
            search_timeout,
        }
    }

    /// Also search with model-generated phrasings of the question
    pub fn with_expander(mut self, expander: QueryExpander, on_error: ExpansionFailure) -> Self {
        self.expander = Some(expander);
        self.on_expansion_error = on_error;
        self
    }

    /// [question] followed by any expansion terms
    pub async fn search_queries(&self, question: &str) -> Result<Vec<String>> {
        let mut queries = vec![question.to_string()];

        if let Some(expander) = &self.expander {
            match expander.expand(question).await {
                Ok(terms) => queries.extend(terms),
                Err(e) if self.on_expansion_error == ExpansionFailure::Degrade => {
                    tracing::warn!(error = %e, "query expansion failed, searching with the question only");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(queries)
    }

    /// Retrieve context for a question
    pub async fn retrieve(&self, question: &str) -> Result<ContextSet> {
        let queries = self.search_queries(question).await?;

        // Searches are independent reads; all must finish before merging
        let searches = queries.iter().map(|query| {
            with_deadline(
                "vector search",
                self.search_timeout,
                self.index.search(query, self.params.top_k),
            )
        });
        let per_query = try_join_all(searches).await?;

        for (query, results) in queries.iter().zip(&per_query) {
            tracing::debug!(query = %query, hits = results.len(), "vector search");
        }

        let all_chunks: Vec<String> = per_query
            .into_iter()
            .flatten()
            .map(|chunk| chunk.text)
            .collect();
        let retrieved = all_chunks.len();

        let context = merge_chunks(
            all_chunks,
            self.params.deduplicate,
            self.params.max_context_chunks,
        );
        tracing::info!(
            queries = queries.len(),
            retrieved,
            kept = context.len(),
            "context retrieved"
        );

        Ok(context)
    }
}
