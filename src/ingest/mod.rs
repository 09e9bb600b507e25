//! Document ingestion
//!
//! Load a file, split it into overlapping chunks and upsert them into the
//! vector index. Must not run concurrently with question answering against
//! the same collection; nothing here locks the index.

pub mod chunker;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::config::IngestConfig;
use crate::errors::Result;
use crate::index::{IndexDocument, VectorIndex};

pub use chunker::TextChunker;
pub use loader::{loader_for, DocumentLoader, PdfLoader, TextLoader};

/// Summary of one ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub pages: usize,
    pub chunks: usize,
}

pub struct Ingestor {
    index: Arc<dyn VectorIndex>,
    chunker: TextChunker,
    batch_size: usize,
}

impl Ingestor {
    pub fn new(index: Arc<dyn VectorIndex>, config: &IngestConfig) -> Self {
        Self {
            index,
            chunker: TextChunker::new(config.chunk_size, config.chunk_overlap),
            batch_size: config.batch_size.max(1),
        }
    }

    /// Split pages into chunks; page metadata is copied onto every chunk
    pub fn chunk_pages(&self, pages: &[IndexDocument]) -> Vec<IndexDocument> {
        let mut chunks = Vec::new();
        for page in pages {
            for text in self.chunker.split(&page.text) {
                let index = chunks.len() as u64;
                let mut chunk = IndexDocument::new(text);
                chunk.metadata = page.metadata.clone();
                chunks.push(chunk.with_metadata("chunk", index));
            }
        }
        chunks
    }

    /// Load, chunk and upsert one file
    pub async fn run(&self, path: &Path) -> Result<IngestReport> {
        let pages = loader_for(path)?.load(path)?;
        let chunks = self.chunk_pages(&pages);
        tracing::info!(
            path = %path.display(),
            pages = pages.len(),
            chunks = chunks.len(),
            "document split"
        );

        let mut written = 0;
        for batch in chunks.chunks(self.batch_size) {
            written += self.index.upsert(batch.to_vec()).await?;
            tracing::debug!(written, total = chunks.len(), "upserted batch");
        }

        Ok(IngestReport {
            pages: pages.len(),
            chunks: written,
        })
    }
}
