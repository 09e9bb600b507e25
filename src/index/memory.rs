//! In-memory vector index
//!
//! Brute-force cosine search over every stored vector. Fine for small
//! corpora and for exercising the pipeline without a Qdrant server.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::embedding::Embedder;
use crate::errors::{RagError, Result};
use crate::index::{IndexDocument, Metadata, RetrievedChunk, VectorIndex};

struct StoredChunk {
    text: String,
    embedding: Vec<f32>,
    metadata: Metadata,
}

pub struct InMemoryIndex {
    embedder: Arc<dyn Embedder>,
    chunks: RwLock<Vec<StoredChunk>>,
}

impl InMemoryIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            chunks: RwLock::new(Vec::new()),
        }
    }
}

/// Cosine similarity; 0.0 when either vector has no magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let query_embedding = self.embedder.embed(query).await?;
        let chunks = self.chunks.read().await;

        let mut scored: Vec<RetrievedChunk> = chunks
            .iter()
            .map(|chunk| RetrievedChunk {
                text: chunk.text.clone(),
                score: cosine_similarity(&chunk.embedding, &query_embedding),
                metadata: chunk.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        Ok(scored)
    }

    async fn upsert(&self, documents: Vec<IndexDocument>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(RagError::Embedding(format!(
                "Expected {} vectors, got {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let mut chunks = self.chunks.write().await;
        let written = documents.len();
        for (doc, embedding) in documents.into_iter().zip(embeddings) {
            chunks.push(StoredChunk {
                text: doc.text,
                embedding,
                metadata: doc.metadata,
            });
        }

        Ok(written)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.chunks.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bag-of-letters embedder: shared letters ⇒ similar vectors
    struct LetterEmbedder;

    #[async_trait]
    impl Embedder for LetterEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0; 26];
                    for c in t.to_ascii_lowercase().bytes().filter(u8::is_ascii_lowercase) {
                        v[(c - b'a') as usize] += 1.0;
                    }
                    v
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            26
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let index = InMemoryIndex::new(Arc::new(LetterEmbedder));
        index
            .upsert(vec![
                IndexDocument::new("zzz zzz"),
                IndexDocument::new("aaa bbb").with_metadata("page", 1),
            ])
            .await
            .unwrap();

        let results = index.search("ab", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "aaa bbb");
        assert_eq!(results[0].metadata["page"], 1);
    }

    #[tokio::test]
    async fn test_empty_index_returns_nothing() {
        let index = InMemoryIndex::new(Arc::new(LetterEmbedder));
        assert!(index.search("anything", 5).await.unwrap().is_empty());
        assert_eq!(index.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upsert_counts() {
        let index = InMemoryIndex::new(Arc::new(LetterEmbedder));
        let written = index
            .upsert(vec![IndexDocument::new("one"), IndexDocument::new("two")])
            .await
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(index.count().await.unwrap(), 2);
    }
}
