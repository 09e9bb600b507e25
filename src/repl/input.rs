//! Question input for chat mode

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

const PROMPT: &str = "pdfbuddy> ";

/// One read from the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Trimmed line, possibly empty
    Line(String),
    /// Ctrl-C
    Interrupted,
    /// Ctrl-D
    Eof,
}

impl ReadOutcome {
    fn classify(read: rustyline::Result<String>) -> Result<Self> {
        match read {
            Ok(line) => Ok(ReadOutcome::Line(line.trim().to_string())),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(err).context("Failed to read input"),
        }
    }
}

/// rustyline editor plus the file its history is kept in
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
}

impl InputHandler {
    pub fn new() -> Result<Self> {
        Ok(InputHandler {
            editor: DefaultEditor::new()?,
            history_path: None,
        })
    }

    /// Editor whose history is loaded from, and saved back to, `path`
    pub fn with_history(path: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        if path.exists() {
            // An unreadable history file only costs the previous questions
            if let Err(e) = editor.load_history(&path) {
                tracing::debug!(error = %e, path = %path.display(), "history not loaded");
            }
        }

        Ok(InputHandler {
            editor,
            history_path: Some(path),
        })
    }

    pub fn read_line(&mut self) -> Result<ReadOutcome> {
        let outcome = ReadOutcome::classify(self.editor.readline(PROMPT))?;
        if let ReadOutcome::Line(line) = &outcome {
            if !line.is_empty() {
                self.editor.add_history_entry(line.as_str())?;
            }
        }
        Ok(outcome)
    }

    pub fn save_history(&mut self) -> Result<()> {
        let Some(path) = &self.history_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        self.editor
            .save_history(path)
            .with_context(|| format!("Failed to save history to {}", path.display()))
    }
}
