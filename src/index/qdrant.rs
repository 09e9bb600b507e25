//! Qdrant-backed vector index
//!
//! Chunk text is stored in the `document` payload field; every other
//! payload field is surfaced as metadata on search results.
use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::IndexConfig;
use crate::embedding::Embedder;
use crate::errors::{RagError, Result};
use crate::index::{IndexDocument, Metadata, RetrievedChunk, VectorIndex};

const DOCUMENT_FIELD: &str = "document";

/// Vector index over one Qdrant collection
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
    embedder: Arc<dyn Embedder>,
    embed_timeout: Duration,
}

impl QdrantIndex {
    /// Open an existing collection. A missing collection is a setup error:
    /// the document has not been ingested yet.
    pub async fn connect(
        config: &IndexConfig,
        embedder: Arc<dyn Embedder>,
        embed_timeout: Duration,
    ) -> Result<Self> {
        if config.require_persist_dir && !config.persist_dir.exists() {
            return Err(RagError::Setup(format!(
                "Index directory {} not found. Run `pdfbuddy ingest <pdf>` first.",
                config.persist_dir.display()
            )));
        }

        let index = Self::build(config, embedder, embed_timeout)?;
        if !index.collection_exists().await? {
            return Err(RagError::Setup(format!(
                "Collection '{}' not found. Run `pdfbuddy ingest <pdf>` first.",
                index.collection
            )));
        }

        Ok(index)
    }

    /// Open the collection, creating it sized to the embedder if absent
    pub async fn open_or_create(
        config: &IndexConfig,
        embedder: Arc<dyn Embedder>,
        embed_timeout: Duration,
    ) -> Result<Self> {
        let index = Self::build(config, embedder, embed_timeout)?;

        if !index.collection_exists().await? {
            let dimension = index.embedder.dimension() as u64;
            index
                .client
                .create_collection(
                    CreateCollectionBuilder::new(index.collection.clone())
                        .vectors_config(VectorParamsBuilder::new(dimension, Distance::Cosine)),
                )
                .await
                .map_err(|e| {
                    RagError::VectorIndex(format!(
                        "Failed to create collection {}: {}",
                        index.collection, e
                    ))
                })?;
            tracing::info!(collection = %index.collection, dimension, "created collection");
        }

        Ok(index)
    }

    fn build(
        config: &IndexConfig,
        embedder: Arc<dyn Embedder>,
        embed_timeout: Duration,
    ) -> Result<Self> {
        let client = Qdrant::from_url(&config.url)
            .build()
            .map_err(|e| RagError::Setup(format!("Failed to create Qdrant client: {}", e)))?;

        Ok(Self {
            client,
            collection: config.collection.clone(),
            embedder,
            embed_timeout,
        })
    }

    async fn collection_exists(&self) -> Result<bool> {
        self.client
            .collection_exists(self.collection.as_str())
            .await
            .map_err(|e| RagError::Setup(format!("Cannot reach vector index: {}", e)))
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        crate::rag::with_deadline("query embedding", self.embed_timeout, self.embedder.embed(query))
            .await
    }

    /// Collection name
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let vector = self.embed_query(query).await?;

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(self.collection.clone(), vector, k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| RagError::VectorIndex(format!("Failed to search points: {}", e)))?;

        let chunks = response
            .result
            .into_iter()
            .map(|point| {
                let mut payload = point.payload;
                let text = payload
                    .remove(DOCUMENT_FIELD)
                    .and_then(|v| qdrant_value_to_string(&v))
                    .unwrap_or_default();

                let metadata: Metadata = payload
                    .iter()
                    .filter_map(|(key, value)| {
                        qdrant_to_json_value(value).map(|json| (key.clone(), json))
                    })
                    .collect();

                RetrievedChunk {
                    text,
                    score: point.score,
                    metadata,
                }
            })
            .collect();

        Ok(chunks)
    }

    async fn upsert(&self, documents: Vec<IndexDocument>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = crate::rag::with_deadline(
            "batch embedding",
            self.embed_timeout,
            self.embedder.embed_batch(&texts),
        )
        .await?;

        let points = build_points(documents, embeddings)?;
        let written = points.len();
        self.client
            .upsert_points(UpsertPointsBuilder::new(self.collection.clone(), points).wait(true))
            .await
            .map_err(|e| RagError::VectorIndex(format!("Failed to upsert points: {}", e)))?;

        Ok(written)
    }

    async fn count(&self) -> Result<u64> {
        let info = self
            .client
            .collection_info(self.collection.as_str())
            .await
            .map_err(|e| RagError::VectorIndex(format!("Failed to get collection info: {}", e)))?;

        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
    }
}

// Helper functions for type conversions
/// One point per document; a short embedder reply is an error, not a partial write
fn build_points(documents: Vec<IndexDocument>, embeddings: Vec<Vec<f32>>) -> Result<Vec<PointStruct>> {
    if embeddings.len() != documents.len() {
        return Err(RagError::Embedding(format!(
            "Expected {} vectors, got {}",
            documents.len(),
            embeddings.len()
        )));
    }

    Ok(documents
        .into_iter()
        .zip(embeddings)
        .map(|(doc, embedding)| {
            let mut payload: HashMap<String, QdrantValue> = doc
                .metadata
                .into_iter()
                .map(|(key, value)| (key, json_to_qdrant_value(value)))
                .collect();
            payload.insert(DOCUMENT_FIELD.to_string(), QdrantValue::from(doc.text));
            PointStruct::new(uuid::Uuid::new_v4().to_string(), embedding, payload)
        })
        .collect())
}

fn json_to_qdrant_value(json: JsonValue) -> QdrantValue {
    match json {
        JsonValue::String(s) => QdrantValue::from(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                QdrantValue::from(i)
            } else if let Some(f) = n.as_f64() {
                QdrantValue::from(f)
            } else {
                QdrantValue::from(0_i64)
            }
        }
        JsonValue::Bool(b) => QdrantValue::from(b),
        other => QdrantValue::from(other.to_string()),
    }
}

fn qdrant_to_json_value(value: &QdrantValue) -> Option<JsonValue> {
    use qdrant_client::qdrant::value::Kind;

    value.kind.as_ref().and_then(|kind| match kind {
        Kind::StringValue(s) => Some(JsonValue::String(s.clone())),
        Kind::IntegerValue(i) => Some(JsonValue::Number((*i).into())),
        Kind::DoubleValue(f) => serde_json::Number::from_f64(*f).map(JsonValue::Number),
        Kind::BoolValue(b) => Some(JsonValue::Bool(*b)),
        _ => None,
    })
}

fn qdrant_value_to_string(value: &QdrantValue) -> Option<String> {
    use qdrant_client::qdrant::value::Kind;

    match value.kind.as_ref()? {
        Kind::StringValue(s) => Some(s.clone()),
        _ => None,
    }
}
