//! Error types for PdfBuddy
//!
//! Separates setup problems (detected before any question is asked) from
//! collaborator failures that abort a single pipeline run.

use thiserror::Error;

/// Main error type for the PdfBuddy pipeline
#[derive(Error, Debug)]
pub enum RagError {
    /// Index/collection missing or a collaborator is misconfigured
    #[error("Setup error: {0}")]
    Setup(String),

    /// Embedding provider failures
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index failures (search or upsert)
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// Language model call failures
    #[error("Language model error: {0}")]
    LanguageModel(String),

    /// Deadline around an external call expired
    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// Rejected pipeline input (e.g. blank question)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Document loading / chunking errors
    #[error("Ingestion error: {0}")]
    Ingest(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// True for errors that must be fixed before any question can be answered
    pub fn is_setup(&self) -> bool {
        matches!(self, RagError::Setup(_) | RagError::Config(_))
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RagError>;
