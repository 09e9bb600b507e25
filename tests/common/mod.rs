//! Test doubles for the pipeline collaborators

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pdfbuddy::config::TimeoutConfig;
use pdfbuddy::embedding::Embedder;
use pdfbuddy::errors::{RagError, Result};
use pdfbuddy::index::{IndexDocument, RetrievedChunk, VectorIndex};
use pdfbuddy::llm::LanguageModel;
use pdfbuddy::rag::{PipelineConfig, RagPipeline};

/// Prefix of the expansion instruction prompt
pub const EXPANSION_PROMPT_PREFIX: &str = "Provide exactly";

/// Language model with one canned reply per call kind
pub struct ScriptedModel {
    expansion_reply: Result<String>,
    answer_reply: String,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(expansion_reply: &str, answer_reply: &str) -> Self {
        Self {
            expansion_reply: Ok(expansion_reply.to_string()),
            answer_reply: answer_reply.to_string(),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Expansion call fails; the answer call still succeeds
    pub fn failing_expansion(answer_reply: &str) -> Self {
        Self {
            expansion_reply: Err(RagError::LanguageModel("HTTP 503".to_string())),
            ..Self::new("", answer_reply)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn answer_prompts(&self) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|p| !p.starts_with(EXPANSION_PROMPT_PREFIX))
            .collect()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if prompt.starts_with(EXPANSION_PROMPT_PREFIX) {
            match &self.expansion_reply {
                Ok(reply) => Ok(reply.clone()),
                Err(e) => Err(RagError::LanguageModel(e.to_string())),
            }
        } else {
            Ok(self.answer_reply.clone())
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Index answering each query from a fixed table
#[derive(Default)]
pub struct TableIndex {
    results: HashMap<String, Vec<String>>,
    fallback: Vec<String>,
    fail: bool,
    searches: Mutex<Vec<(String, usize)>>,
}

impl TableIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: &str, chunks: &[&str]) -> Self {
        self.results
            .insert(query.to_string(), chunks.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Chunks returned for queries missing from the table
    pub fn with_fallback(mut self, chunks: &[&str]) -> Self {
        self.fallback = chunks.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// (query, k) for every search, in call order
    pub fn searches(&self) -> Vec<(String, usize)> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorIndex for TableIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        self.searches.lock().unwrap().push((query.to_string(), k));
        if self.fail {
            return Err(RagError::VectorIndex("connection refused".to_string()));
        }

        let chunks = self.results.get(query).unwrap_or(&self.fallback);
        Ok(chunks
            .iter()
            .take(k)
            .enumerate()
            .map(|(i, text)| RetrievedChunk {
                text: text.clone(),
                score: 1.0 - i as f32 * 0.1,
                metadata: Default::default(),
            })
            .collect())
    }

    async fn upsert(&self, documents: Vec<IndexDocument>) -> Result<usize> {
        Ok(documents.len())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.results.values().map(Vec::len).sum::<usize>() as u64)
    }
}

/// Letter-frequency embedder: deterministic, no model download
pub struct LetterEmbedder;

#[async_trait]
impl Embedder for LetterEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut counts = vec![0.0f32; 26];
                for c in text.to_ascii_lowercase().chars() {
                    if c.is_ascii_lowercase() {
                        counts[(c as u8 - b'a') as usize] += 1.0;
                    }
                }
                counts
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        26
    }
}

pub fn pipeline(
    llm: Arc<dyn LanguageModel>,
    index: Arc<dyn VectorIndex>,
    config: &PipelineConfig,
) -> RagPipeline {
    RagPipeline::new(llm, index, config, &TimeoutConfig::default())
}

pub fn chunks(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{} chunk {}", prefix, i)).collect()
}
