//! Embedding providers
//!
//! Text → fixed-length vector. Deterministic for identical input; used both
//! when ingesting chunks and when searching with a query.

pub mod engine;

use async_trait::async_trait;

use crate::errors::{RagError, Result};

pub use engine::CandleEmbedder;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input in the same order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| RagError::Embedding("Embedder returned no vector".into()))
    }
}
