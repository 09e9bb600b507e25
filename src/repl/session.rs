//! Chat transcript for the interactive session
//!
//! Keeps every question/answer turn, including failed ones, so `/history`
//! can replay the conversation after a collaborator error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::rag::AnswerRecord;

/// Maximum number of turns kept in memory
const MAX_TRANSCRIPT_SIZE: usize = 500;

/// Outcome of one chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    Answered {
        answer: String,
        confidence_score: f64,
        context_chunks: Vec<String>,
    },
    Failed {
        error: String,
    },
}

/// One question asked in chat mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub outcome: TurnOutcome,
    pub asked_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ChatTurn {
    pub fn answered(record: AnswerRecord, duration_ms: u64) -> Self {
        ChatTurn {
            question: record.question,
            outcome: TurnOutcome::Answered {
                answer: record.answer,
                confidence_score: record.confidence_score,
                context_chunks: record.context_chunks,
            },
            asked_at: Utc::now(),
            duration_ms,
        }
    }

    pub fn failed(question: impl Into<String>, error: impl ToString, duration_ms: u64) -> Self {
        ChatTurn {
            question: question.into(),
            outcome: TurnOutcome::Failed {
                error: error.to_string(),
            },
            asked_at: Utc::now(),
            duration_ms,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self.outcome, TurnOutcome::Answered { .. })
    }
}

/// Bounded list of chat turns, oldest evicted first
pub struct Transcript {
    turns: VecDeque<ChatTurn>,
    started_at: DateTime<Utc>,
    total_turns: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Transcript {
            turns: VecDeque::new(),
            started_at: Utc::now(),
            total_turns: 0,
        }
    }

    pub fn record(&mut self, turn: ChatTurn) {
        if self.turns.len() >= MAX_TRANSCRIPT_SIZE {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
        self.total_turns += 1;
    }

    /// Most recent turns, newest first
    pub fn recent(&self, limit: usize) -> Vec<&ChatTurn> {
        self.turns.iter().rev().take(limit).collect()
    }

    /// Last turn that produced an answer
    pub fn last_answered(&self) -> Option<&ChatTurn> {
        self.turns.iter().rev().find(|turn| turn.is_answered())
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turns recorded since the session started, including evicted ones
    pub fn total_turns(&self) -> usize {
        self.total_turns
    }

    pub fn failed_count(&self) -> usize {
        self.turns.iter().filter(|turn| !turn.is_answered()).count()
    }

    /// Seconds since the session started
    pub fn elapsed_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Serialize the kept turns as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        let turns: Vec<&ChatTurn> = self.turns.iter().collect();
        serde_json::to_string_pretty(&turns)
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
