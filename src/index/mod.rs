//! Vector index abstraction
//!
//! Stores (vector, text, metadata) triples and answers nearest-neighbour
//! queries by text. Embedding the query is the index's concern, so the
//! retrieval stage only ever deals in strings.

pub mod memory;
pub mod qdrant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::errors::Result;

pub use memory::InMemoryIndex;
pub use qdrant::QdrantIndex;

/// Opaque per-chunk source metadata (source path, page, chunk number)
pub type Metadata = HashMap<String, JsonValue>;

/// A text segment returned by a similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A chunk ready to be written into the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl IndexDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Top-`k` chunks most similar to `query`, best first. Read-only.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>>;

    /// Embed and store documents. Only used by ingestion.
    async fn upsert(&self, documents: Vec<IndexDocument>) -> Result<usize>;

    /// Number of stored chunks
    async fn count(&self) -> Result<u64>;
}
