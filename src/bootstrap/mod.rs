//! Bootstrap for PdfBuddy
//!
//! Constructs the collaborators once at startup and detects setup problems
//! (invalid config, missing API key, unreachable index, missing collection)
//! before any question is asked.

use std::sync::Arc;

use crate::config::Config;
use crate::embedding::{CandleEmbedder, Embedder};
use crate::errors::{RagError, Result};
use crate::index::{QdrantIndex, VectorIndex};
use crate::llm::{self, LanguageModel};
use crate::rag::RagPipeline;

/// Collaborators shared read-only by every pipeline run
pub struct Collaborators {
    pub llm: Arc<dyn LanguageModel>,
    pub index: Arc<dyn VectorIndex>,
}

/// Startup wiring
pub struct Bootstrap {
    config: Config,
}

impl Bootstrap {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the embedding model; downloads happen off the async runtime
    pub async fn load_embedder(&self) -> Result<Arc<dyn Embedder>> {
        let model_id = self.config.embedding.model_id.clone();
        let embedder = tokio::task::spawn_blocking(move || CandleEmbedder::new(&model_id))
            .await
            .map_err(|e| RagError::Setup(format!("Embedding model loader crashed: {}", e)))??;
        Ok(Arc::new(embedder))
    }

    /// Everything needed to answer questions. Fails with a setup error when
    /// the document has not been ingested.
    pub async fn for_questions(&self) -> Result<Collaborators> {
        self.config.validate()?;

        let llm = llm::from_config(&self.config.llm)?;
        let embedder = self.load_embedder().await?;
        let index = QdrantIndex::connect(
            &self.config.index,
            embedder,
            self.config.timeouts.embedding(),
        )
        .await?;

        tracing::info!(
            model = llm.model(),
            collection = index.collection(),
            "collaborators ready"
        );

        Ok(Collaborators {
            llm,
            index: Arc::new(index),
        })
    }

    /// Index handle for ingestion; creates the collection if needed
    pub async fn for_ingest(&self) -> Result<Arc<dyn VectorIndex>> {
        self.config.validate()?;

        let embedder = self.load_embedder().await?;
        let index = QdrantIndex::open_or_create(
            &self.config.index,
            embedder,
            self.config.timeouts.embedding(),
        )
        .await?;

        Ok(Arc::new(index))
    }

    /// Wire the pipeline from collaborators
    pub fn pipeline(&self, collaborators: &Collaborators) -> RagPipeline {
        RagPipeline::new(
            collaborators.llm.clone(),
            collaborators.index.clone(),
            &self.config.pipeline,
            &self.config.timeouts,
        )
    }
}
