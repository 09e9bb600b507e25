use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::RagError;
use crate::rag::pipeline::PipelineConfig;

/// Collection the ingested document lives in
pub const DEFAULT_COLLECTION: &str = "agentic_ai_collection";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Which completion API the language model client speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI-compatible `/chat/completions` (OpenRouter, vLLM, ...)
    OpenAi,
    /// Local Ollama `/api/generate`
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub referer: Option<String>,
    pub title: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "deepseek/deepseek-r1-0528:free".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            referer: Some("http://localhost:3000".to_string()),
            title: Some("pdfbuddy".to_string()),
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model_id: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_id: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Qdrant gRPC endpoint
    pub url: String,
    pub collection: String,
    /// Qdrant storage directory when the server runs locally
    pub persist_dir: PathBuf,
    /// Treat a missing `persist_dir` as a setup error
    pub require_persist_dir: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            persist_dir: PathBuf::from("./qdrant_storage"),
            require_persist_dir: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Chunks embedded and upserted per request
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 150,
            batch_size: 32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub llm_secs: u64,
    pub embedding_secs: u64,
    pub search_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_secs: 120,
            embedding_secs: 30,
            search_secs: 15,
        }
    }
}

impl TimeoutConfig {
    pub fn llm(&self) -> Duration {
        Duration::from_secs(self.llm_secs)
    }

    pub fn embedding(&self) -> Duration {
        Duration::from_secs(self.embedding_secs)
    }

    pub fn search(&self) -> Duration {
        Duration::from_secs(self.search_secs)
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, creating defaults if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            config
        } else {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("Failed to parse config file")?
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;

        Ok(home.join(".pdfbuddy").join("config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(model) = std::env::var("PDFBUDDY_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Ok(url) = std::env::var("PDFBUDDY_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Ok(url) = std::env::var("PDFBUDDY_INDEX_URL") {
            self.index.url = url;
        }
        if let Ok(collection) = std::env::var("PDFBUDDY_COLLECTION") {
            self.index.collection = collection;
        }
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> std::result::Result<(), RagError> {
        self.pipeline.validate()?;

        if self.ingest.chunk_size == 0 {
            return Err(RagError::Config("ingest.chunk_size must be > 0".into()));
        }
        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(RagError::Config(format!(
                "ingest.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.ingest.chunk_overlap, self.ingest.chunk_size
            )));
        }
        if self.ingest.batch_size == 0 {
            return Err(RagError::Config("ingest.batch_size must be > 0".into()));
        }
        if self.index.collection.trim().is_empty() {
            return Err(RagError::Config("index.collection must not be empty".into()));
        }
        for (key, secs) in [
            ("timeouts.llm_secs", self.timeouts.llm_secs),
            ("timeouts.embedding_secs", self.timeouts.embedding_secs),
            ("timeouts.search_secs", self.timeouts.search_secs),
        ] {
            if secs == 0 {
                return Err(RagError::Config(format!("{} must be > 0", key)));
            }
        }

        Ok(())
    }
}
