//! PdfBuddy - grounded question answering over a PDF
//!
//! Two-stage retrieval-augmented pipeline: the question (plus model-generated
//! search variants) is matched against a vector index of document chunks, then
//! a language model answers strictly from the retrieved context and reports a
//! confidence score.
//!
//! # Architecture
//!
//! - **Collaborators**: `llm`, `embedding`, `index` (traits + concrete clients)
//! - **Pipeline**: `rag` (expansion, retrieval, prompt, parsing, typed state)
//! - **Ingestion**: `ingest` (load, chunk, upsert)
//! - **Interface**: `cli`, `repl`, `doctor`, `bootstrap`, `telemetry`

pub mod errors;
pub mod config;
pub mod telemetry;

// Collaborators
pub mod llm;
pub mod embedding;
pub mod index;

// Pipeline and ingestion
pub mod rag;
pub mod ingest;

// Interface
pub mod bootstrap;
pub mod cli;
pub mod doctor;
pub mod repl;

// Re-export commonly used types
pub use errors::{RagError, Result};
pub use rag::{AnswerRecord, PipelineConfig, PipelineInput, RagPipeline};
