//! Interactive chat mode
//!
//! Reads questions in a loop, runs each through the pipeline and keeps a
//! transcript. A failed question is reported and recorded; the loop goes on.

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

use anyhow::Result;
use std::path::PathBuf;
use std::time::Instant;

use crate::rag::RagPipeline;
use crate::repl::commands::{is_command, CommandHandler};
pub use crate::repl::display::DisplayManager;
use crate::repl::input::{InputHandler, ReadOutcome};
pub use crate::repl::session::{ChatTurn, Transcript, TurnOutcome};

/// What the loop should do after one line of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Chat mode configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub history_file: Option<PathBuf>,
    pub show_progress: bool,
    /// Print source chunks under every answer
    pub show_context: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            history_file: None,
            show_progress: true,
            show_context: true,
        }
    }
}

impl ChatConfig {
    /// Question history stored next to the config file (~/.pdfbuddy/history)
    pub fn default_history_file() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".pdfbuddy").join("history"))
    }
}

/// Chat session coordinator
pub struct ChatSession {
    input_handler: InputHandler,
    command_handler: CommandHandler,
    transcript: Transcript,
    display_manager: DisplayManager,
    show_context: bool,
}

impl ChatSession {
    pub fn new(config: ChatConfig) -> Result<Self> {
        let input_handler = match config.history_file {
            Some(path) => InputHandler::with_history(path)?,
            None => InputHandler::new()?,
        };

        let display_manager = if config.show_progress {
            DisplayManager::new()
        } else {
            DisplayManager::new().without_progress()
        };

        Ok(ChatSession {
            input_handler,
            command_handler: CommandHandler::new(),
            transcript: Transcript::new(),
            display_manager,
            show_context: config.show_context,
        })
    }

    pub fn show_welcome(&self, version: &str, model: &str, collection: &str) {
        self.display_manager.show_banner(version, model, collection);
    }

    /// Run the read-ask-print loop until `/exit` or Ctrl-D
    pub async fn run(&mut self, pipeline: &RagPipeline) -> Result<()> {
        loop {
            let line = match self.input_handler.read_line() {
                Ok(ReadOutcome::Line(line)) => line,
                Ok(ReadOutcome::Eof) => break,
                Ok(ReadOutcome::Interrupted) => {
                    self.display_manager
                        .show_info("Interrupted. Type /exit or press Ctrl-D to quit.");
                    continue;
                }
                Err(e) => {
                    self.save()?;
                    return Err(e);
                }
            };

            if self.handle_input(&line, pipeline).await? == Flow::Exit {
                break;
            }
        }

        self.save()
    }

    /// Handle one line: a slash command or a question
    pub async fn handle_input(&mut self, input: &str, pipeline: &RagPipeline) -> Result<Flow> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Flow::Continue);
        }

        if is_command(input) {
            let command = self.command_handler.parse(input);
            let keep_going =
                self.command_handler
                    .execute(command, &mut self.transcript, &self.display_manager)?;
            return Ok(if keep_going { Flow::Continue } else { Flow::Exit });
        }

        self.ask(input, pipeline).await;
        Ok(Flow::Continue)
    }

    /// Ask one question; errors are displayed and recorded, never propagated
    pub async fn ask(&mut self, question: &str, pipeline: &RagPipeline) {
        let start = Instant::now();
        self.display_manager.start_search();

        let result = pipeline.ask(question).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(record) => {
                self.display_manager.show_answer(&record, self.show_context);
                self.transcript.record(ChatTurn::answered(record, duration_ms));
            }
            Err(e) => {
                tracing::warn!(error = %e, "question failed");
                self.display_manager.show_error(&e.to_string());
                self.transcript
                    .record(ChatTurn::failed(question, &e, duration_ms));
            }
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Persist question history
    pub fn save(&mut self) -> Result<()> {
        self.input_handler.save_history()
    }
}
