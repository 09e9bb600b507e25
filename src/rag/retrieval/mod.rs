// Context retrieval: multi-query search, merge, dedup, cap
pub mod engine;

pub use engine::{merge_chunks, ContextRetriever, ContextSet, RetrievalParams};
