//! Typed pipeline state
//!
//! A run starts with only the question. Each stage consumes the state and
//! returns the next one, so a field can only be set by the stage that owns
//! it and the generator cannot run before context exists:
//!
//! ```text
//! PipelineState<Pending> --retrieve--> PipelineState<Retrieved> --generate--> PipelineState<Answered>
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rag::generator::GeneratedAnswer;
use crate::rag::parser::ParseStatus;
use crate::rag::retrieval::ContextSet;

/// Stage currently executing, for logs and progress display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    Retrieving,
    Generating,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Retrieving => write!(f, "retrieving"),
            PipelineStage::Generating => write!(f, "generating"),
        }
    }
}

/// Only the question is known
#[derive(Debug, Clone)]
pub struct Pending;

/// Context has been retrieved
#[derive(Debug, Clone)]
pub struct Retrieved {
    context_chunks: ContextSet,
}

/// Answer has been generated
#[derive(Debug, Clone)]
pub struct Answered {
    context_chunks: ContextSet,
    answer: GeneratedAnswer,
}

#[derive(Debug, Clone)]
pub struct PipelineState<S> {
    question: String,
    stage: S,
}

impl<S> PipelineState<S> {
    pub fn question(&self) -> &str {
        &self.question
    }
}

impl PipelineState<Pending> {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            stage: Pending,
        }
    }

    pub fn with_context(self, context_chunks: ContextSet) -> PipelineState<Retrieved> {
        PipelineState {
            question: self.question,
            stage: Retrieved { context_chunks },
        }
    }
}

impl PipelineState<Retrieved> {
    pub fn context_chunks(&self) -> &ContextSet {
        &self.stage.context_chunks
    }

    pub fn with_answer(self, answer: GeneratedAnswer) -> PipelineState<Answered> {
        PipelineState {
            question: self.question,
            stage: Answered {
                context_chunks: self.stage.context_chunks,
                answer,
            },
        }
    }
}

impl PipelineState<Answered> {
    pub fn context_chunks(&self) -> &ContextSet {
        &self.stage.context_chunks
    }

    pub fn answer(&self) -> &str {
        &self.stage.answer.answer
    }

    pub fn confidence_score(&self) -> f64 {
        self.stage.answer.confidence_score
    }

    pub fn into_record(self) -> AnswerRecord {
        AnswerRecord {
            question: self.question,
            answer: self.stage.answer.answer,
            context_chunks: self.stage.context_chunks.into_inner(),
            confidence_score: self.stage.answer.confidence_score,
            parse_status: self.stage.answer.parse_status,
        }
    }
}

/// Pipeline entry-point input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineInput {
    pub question: String,
}

/// Final output of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: String,
    pub answer: String,
    pub context_chunks: Vec<String>,
    pub confidence_score: f64,
    pub parse_status: ParseStatus,
}
