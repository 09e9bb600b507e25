//! Local sentence embeddings via Candle
//!
//! Runs a BERT-family sentence-transformer (all-MiniLM-L6-v2 by default)
//! on the CPU. Weights are fetched from the HuggingFace Hub on first use.
use anyhow::Context;
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};

use crate::embedding::Embedder;
use crate::errors::{RagError, Result};

/// BERT position limit when the model config does not state one
const DEFAULT_MAX_POSITIONS: usize = 512;

/// Embedding engine backed by a Candle BERT model
pub struct CandleEmbedder {
    model: Arc<BertModel>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
    dimension: usize,
}

impl CandleEmbedder {
    /// Load `model_id` from the HuggingFace Hub (downloads on first use)
    pub fn new(model_id: &str) -> Result<Self> {
        Self::load(model_id).map_err(|e| RagError::Setup(format!("{:#}", e)))
    }

    fn load(model_id: &str) -> anyhow::Result<Self> {
        let device = Device::Cpu;

        let api = Api::new().context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo.get("config.json")
            .context("Failed to download model config")?;
        let tokenizer_path = repo.get("tokenizer.json")
            .context("Failed to download tokenizer")?;
        let weights_path = repo.get("model.safetensors")
            .context("Failed to download model weights")?;

        let config_contents = std::fs::read_to_string(config_path)
            .context("Failed to read config file")?;
        let config: Config = serde_json::from_str(&config_contents)
            .context("Failed to parse model config")?;
        let dimension = hidden_size(&config_contents)?;
        let max_positions = max_positions(&config_contents);

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        limit_tokens(&mut tokenizer, max_positions)?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .context("Failed to load model weights")?
        };

        let model = BertModel::load(vb, &config)
            .context("Failed to create BERT model")?;

        tracing::info!(model = model_id, dimension, max_positions, "embedding model loaded");

        Ok(Self {
            model: Arc::new(model),
            tokenizer: Arc::new(tokenizer),
            device,
            dimension,
        })
    }

    /// Forward pass for a batch; blocking, CPU bound
    fn encode(
        model: &BertModel,
        tokenizer: &Tokenizer,
        device: &Device,
        texts: Vec<String>,
    ) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = tokenizer
            .encode_batch(texts, true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let batch_size = encodings.len();
        let max_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);

        // Right-pad ids and mask to the longest sequence
        let mut flat_ids = Vec::with_capacity(batch_size * max_len);
        let mut flat_mask = Vec::with_capacity(batch_size * max_len);
        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            flat_ids.extend_from_slice(ids);
            flat_ids.extend(std::iter::repeat(0u32).take(max_len - ids.len()));
            flat_mask.extend_from_slice(mask);
            flat_mask.extend(std::iter::repeat(0u32).take(max_len - mask.len()));
        }

        let token_ids = Tensor::from_vec(flat_ids, (batch_size, max_len), device)?;
        let attention_mask = Tensor::from_vec(flat_mask, (batch_size, max_len), device)?;
        let token_type_ids = token_ids.zeros_like()?;

        let embeddings = model.forward(&token_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = Self::mean_pool(&embeddings, &attention_mask)?;
        let normalized = Self::l2_normalize(&pooled)?;

        Ok(normalized.to_vec2::<f32>()?)
    }

    /// Mean pooling with attention mask
    fn mean_pool(embeddings: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
        let mask_expanded = attention_mask
            .unsqueeze(2)?
            .expand(embeddings.shape())?
            .to_dtype(embeddings.dtype())?;

        let sum_embeddings = (embeddings * &mask_expanded)?.sum(1)?;
        let sum_mask = mask_expanded.sum(1)?.clamp(1e-9, f64::MAX)?;

        sum_embeddings.broadcast_div(&sum_mask)
    }

    fn l2_normalize(v: &Tensor) -> candle_core::Result<Tensor> {
        let norm = v.sqr()?.sum_keepdim(1)?.sqrt()?.clamp(1e-12, f64::MAX)?;
        v.broadcast_div(&norm)
    }
}

fn hidden_size(config_json: &str) -> anyhow::Result<usize> {
    let value: serde_json::Value = serde_json::from_str(config_json)?;
    value["hidden_size"]
        .as_u64()
        .map(|n| n as usize)
        .context("Model config has no hidden_size")
}

fn max_positions(config_json: &str) -> usize {
    serde_json::from_str::<serde_json::Value>(config_json)
        .ok()
        .and_then(|value| value["max_position_embeddings"].as_u64())
        .map_or(DEFAULT_MAX_POSITIONS, |n| n as usize)
}

/// Cut every encoding to the model's position table, special tokens included
fn limit_tokens(tokenizer: &mut Tokenizer, max_positions: usize) -> anyhow::Result<()> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_positions,
            ..Default::default()
        }))
        .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;
    Ok(())
}

#[async_trait]
impl Embedder for CandleEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = self.model.clone();
        let tokenizer = self.tokenizer.clone();
        let device = self.device.clone();
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || Self::encode(&model, &tokenizer, &device, texts))
            .await
            .map_err(|e| RagError::Embedding(format!("Embedding task failed: {}", e)))?
            .map_err(|e| RagError::Embedding(format!("{:#}", e)))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

    #[test]
    fn test_hidden_size_parsing() {
        assert_eq!(hidden_size(r#"{"hidden_size": 384}"#).unwrap(), 384);
        assert!(hidden_size(r#"{"vocab_size": 30522}"#).is_err());
    }

    #[test]
    fn test_max_positions_parsing() {
        assert_eq!(max_positions(r#"{"max_position_embeddings": 256}"#), 256);
        assert_eq!(max_positions(r#"{"hidden_size": 384}"#), DEFAULT_MAX_POSITIONS);
    }

    const WORD_TOKENIZER: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {"type": "WordLevel", "vocab": {"[UNK]": 0, "agent": 1}, "unk_token": "[UNK]"}
    }"#;

    #[test]
    fn test_long_question_is_truncated() {
        let question = "agent ".repeat(40);
        let mut tokenizer = Tokenizer::from_bytes(WORD_TOKENIZER.as_bytes()).unwrap();
        let untruncated = tokenizer.encode(question.as_str(), true).unwrap();
        assert_eq!(untruncated.get_ids().len(), 40);

        limit_tokens(&mut tokenizer, 16).unwrap();
        let encodings = tokenizer
            .encode_batch(vec![question.clone(), "agent".to_string()], true)
            .unwrap();
        assert_eq!(encodings[0].get_ids().len(), 16);
        assert_eq!(encodings[1].get_ids().len(), 1);
    }

    #[tokio::test]
    #[ignore] // Integration test - requires model download
    async fn test_embed_question_longer_than_position_table() {
        let engine = CandleEmbedder::new(MODEL_ID).expect("Failed to create engine");
        let question = "what does the chapter say about planning ".repeat(200);
        let embedding = engine.embed(&question).await.expect("Failed to embed long text");
        assert_eq!(embedding.len(), 384);
    }

    #[tokio::test]
    #[ignore] // Integration test - requires model download
    async fn test_embed_single_text() {
        let engine = CandleEmbedder::new(MODEL_ID).expect("Failed to create engine");
        let embedding = engine.embed("Hello world").await.expect("Failed to embed");
        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    #[ignore] // Integration test - requires model download
    async fn test_embed_batch_deterministic() {
        let engine = CandleEmbedder::new(MODEL_ID).expect("Failed to create engine");
        let texts = vec!["task decomposition".to_string(), "task decomposition".to_string()];
        let embeddings = engine.embed_batch(&texts).await.expect("Failed to embed batch");
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0], embeddings[1]);
    }

    #[tokio::test]
    #[ignore] // Integration test - requires model download
    async fn test_embed_empty_batch() {
        let engine = CandleEmbedder::new(MODEL_ID).expect("Failed to create engine");
        let embeddings = engine.embed_batch(&[]).await.expect("Failed to embed empty batch");
        assert!(embeddings.is_empty());
    }
}
