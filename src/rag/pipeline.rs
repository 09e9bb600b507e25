// End-to-end RAG pipeline: Retriever -> Generator
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::TimeoutConfig;
use crate::errors::{RagError, Result};
use crate::index::VectorIndex;
use crate::llm::LanguageModel;
use crate::rag::expander::{QueryExpander, DEFAULT_EXPANSIONS};
use crate::rag::generator::AnswerGenerator;
use crate::rag::retrieval::{ContextRetriever, RetrievalParams};
use crate::rag::state::{AnswerRecord, Answered, PipelineInput, PipelineStage, PipelineState};

/// What to do when the query-expansion model call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionFailure {
    /// Fail the whole run
    Abort,
    /// Log and search with the question only
    Degrade,
}

/// RAG pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Search with model-generated phrasings as well as the question
    pub expand_queries: bool,
    /// Alternative phrasings requested from the model
    pub expansion_count: usize,
    /// Nearest neighbours per query
    pub top_k: usize,
    /// Context cap after merging (None = unbounded)
    pub max_context_chunks: Option<usize>,
    /// Drop repeated chunk texts
    pub deduplicate: bool,
    pub on_expansion_error: ExpansionFailure,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::enhanced()
    }
}

impl PipelineConfig {
    /// Query expansion, K=5 per query, dedup, at most 6 chunks
    pub fn enhanced() -> Self {
        Self {
            expand_queries: true,
            expansion_count: DEFAULT_EXPANSIONS,
            top_k: 5,
            max_context_chunks: Some(6),
            deduplicate: true,
            on_expansion_error: ExpansionFailure::Abort,
        }
    }

    /// Single search with the question, K=3, no dedup or cap
    pub fn simple() -> Self {
        Self {
            expand_queries: false,
            expansion_count: 0,
            top_k: 3,
            max_context_chunks: None,
            deduplicate: false,
            on_expansion_error: ExpansionFailure::Abort,
        }
    }

    pub fn retrieval_params(&self) -> RetrievalParams {
        RetrievalParams {
            top_k: self.top_k,
            max_context_chunks: self.max_context_chunks,
            deduplicate: self.deduplicate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(RagError::Config("pipeline.top_k must be > 0".into()));
        }
        if self.max_context_chunks == Some(0) {
            return Err(RagError::Config(
                "pipeline.max_context_chunks must be > 0 when set".into(),
            ));
        }
        if self.expand_queries && self.expansion_count == 0 {
            return Err(RagError::Config(
                "pipeline.expansion_count must be > 0 when expand_queries is on".into(),
            ));
        }
        Ok(())
    }
}

/// Two-stage question answering over an injected index and model
pub struct RagPipeline {
    retriever: ContextRetriever,
    generator: AnswerGenerator,
}

impl RagPipeline {
    /// Wire the stages from already-constructed collaborators
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        index: Arc<dyn VectorIndex>,
        config: &PipelineConfig,
        timeouts: &TimeoutConfig,
    ) -> Self {
        let mut retriever = ContextRetriever::new(index, config.retrieval_params(), timeouts.search());
        if config.expand_queries {
            let expander = QueryExpander::new(llm.clone(), config.expansion_count, timeouts.llm());
            retriever = retriever.with_expander(expander, config.on_expansion_error);
        }

        Self {
            retriever,
            generator: AnswerGenerator::new(llm, timeouts.llm()),
        }
    }

    /// Run both stages and return the terminal state
    pub async fn run(&self, question: &str) -> Result<PipelineState<Answered>> {
        if question.trim().is_empty() {
            return Err(RagError::InvalidInput("question must not be empty".into()));
        }

        let state = PipelineState::new(question);

        tracing::info!(stage = %PipelineStage::Retrieving, "pipeline stage");
        let context = self.retriever.retrieve(state.question()).await?;
        let state = state.with_context(context);

        tracing::info!(stage = %PipelineStage::Generating, chunks = state.context_chunks().len(), "pipeline stage");
        let answer = self
            .generator
            .generate(state.question(), state.context_chunks())
            .await?;
        let state = state.with_answer(answer);

        tracing::info!(confidence = state.confidence_score(), "pipeline complete");
        Ok(state)
    }

    /// Answer a question
    pub async fn ask(&self, question: &str) -> Result<AnswerRecord> {
        Ok(self.run(question).await?.into_record())
    }

    /// Record-in, record-out entry point for front ends
    pub async fn invoke(&self, input: PipelineInput) -> Result<AnswerRecord> {
        self.ask(&input.question).await
    }
}
