//! Slash commands available in chat mode

use anyhow::{Context, Result};
use colored::*;
use std::path::{Path, PathBuf};

use crate::repl::display::DisplayManager;
use crate::repl::session::{Transcript, TurnOutcome};

/// Chat mode command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    History { limit: Option<usize> },
    Sources,
    Status,
    Reset,
    Export { path: Option<PathBuf> },
    Clear,
    Exit,
    Unknown { input: String },
}

/// Written by `/export` when no path is given
pub const DEFAULT_EXPORT_FILE: &str = "pdfbuddy-transcript.json";

/// True when the line should be treated as a command rather than a question
pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with('/')
}

/// Parses and executes chat commands
pub struct CommandHandler;

impl CommandHandler {
    pub fn new() -> Self {
        CommandHandler
    }

    /// Parse input string into a command
    pub fn parse(&self, input: &str) -> Command {
        let trimmed = input.trim();

        let Some(body) = trimmed.strip_prefix('/') else {
            return Command::Unknown { input: input.to_string() };
        };

        let parts: Vec<&str> = body.split_whitespace().collect();
        let Some(name) = parts.first() else {
            return Command::Unknown { input: input.to_string() };
        };

        match name.to_lowercase().as_str() {
            "help" | "h" => Command::Help,
            "exit" | "quit" | "q" => Command::Exit,
            "history" => {
                let limit = parts.get(1).and_then(|s| s.parse().ok());
                Command::History { limit }
            }
            "sources" | "src" => Command::Sources,
            "status" => Command::Status,
            "reset" => Command::Reset,
            "export" => Command::Export {
                path: parts.get(1).map(PathBuf::from),
            },
            "clear" | "cls" => Command::Clear,
            _ => Command::Unknown { input: input.to_string() },
        }
    }

    /// Execute a command
    ///
    /// Returns true if the chat should continue, false if it should exit
    pub fn execute(
        &self,
        command: Command,
        transcript: &mut Transcript,
        display: &DisplayManager,
    ) -> Result<bool> {
        match command {
            Command::Help => {
                self.show_help();
                Ok(true)
            }
            Command::Exit => {
                println!("{}", "Goodbye!".green());
                Ok(false)
            }
            Command::History { limit } => {
                self.show_history(transcript, limit.unwrap_or(10));
                Ok(true)
            }
            Command::Sources => {
                match transcript.last_answered().map(|turn| &turn.outcome) {
                    Some(TurnOutcome::Answered { context_chunks, .. }) => {
                        display.show_sources(context_chunks);
                    }
                    _ => println!("{}", "No answered questions yet.".yellow()),
                }
                Ok(true)
            }
            Command::Status => {
                self.show_status(transcript);
                Ok(true)
            }
            Command::Reset => {
                transcript.clear();
                println!("{}", "Transcript cleared.".yellow());
                Ok(true)
            }
            Command::Export { path } => {
                let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));
                if transcript.is_empty() {
                    display.show_warning("Nothing to export yet.");
                    return Ok(true);
                }
                match export_transcript(transcript, &path) {
                    Ok(()) => display.show_info(&format!(
                        "Exported {} turns to {}",
                        transcript.len(),
                        path.display()
                    )),
                    Err(e) => {
                        tracing::warn!(error = %e, "transcript export failed");
                        display.show_warning(&format!("{:#}", e));
                    }
                }
                Ok(true)
            }
            Command::Clear => {
                display.clear_screen()?;
                Ok(true)
            }
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {}", input).red());
                println!("Type {} for available commands", "/help".cyan());
                Ok(true)
            }
        }
    }

    fn show_help(&self) {
        println!("\n{}", "Available Commands:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let commands = [
            ("/help, /h", "Show this help message"),
            ("/history [n]", "Show last n questions (default: 10)"),
            ("/sources", "Show the chunks behind the last answer"),
            ("/status", "Show session statistics"),
            ("/reset", "Clear the transcript"),
            ("/export [file]", "Save the transcript as JSON"),
            ("/clear, /cls", "Clear screen"),
            ("/exit, /quit, /q", "Leave chat mode"),
        ];

        for (cmd, desc) in commands {
            println!("  {:<20} {}", cmd.green(), desc);
        }

        println!("\n{}", "Usage:".bold());
        println!("  - Type a question about the document (no / prefix)");
        println!("  - Use {} for question history", "UP/DOWN arrows".cyan());
        println!("  - Press {} or {} to exit", "Ctrl-D".cyan(), "/exit".cyan());
        println!();
    }

    fn show_history(&self, transcript: &Transcript, limit: usize) {
        let turns = transcript.recent(limit);

        if turns.is_empty() {
            println!("{}", "No questions asked yet.".yellow());
            return;
        }

        println!("\n{}", format!("Question History (last {}):", turns.len()).bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        for (i, turn) in turns.iter().enumerate() {
            let index = turns.len() - i;
            let time = turn.asked_at.format("%H:%M:%S").to_string().dimmed();

            match &turn.outcome {
                TurnOutcome::Answered { confidence_score, .. } => {
                    println!(
                        "  {}. {} [{}] {} {}",
                        index.to_string().cyan(),
                        "✓".green(),
                        time,
                        turn.question,
                        format!("(score {:.2})", confidence_score).dimmed()
                    );
                }
                TurnOutcome::Failed { error } => {
                    println!(
                        "  {}. {} [{}] {}",
                        index.to_string().cyan(),
                        "✗".red(),
                        time,
                        turn.question
                    );
                    println!("     {}", error.red());
                }
            }
        }
        println!();
    }

    fn show_status(&self, transcript: &Transcript) {
        println!("\n{}", "Session Status:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let duration = transcript.elapsed_secs().max(0);
        let duration_str = if duration >= 60 {
            format!("{}m {}s", duration / 60, duration % 60)
        } else {
            format!("{}s", duration)
        };

        println!("  {:<20} {}", "Duration:".bold(), duration_str);
        println!("  {:<20} {}", "Questions asked:".bold(), transcript.total_turns());
        println!("  {:<20} {}", "Failed:".bold(), transcript.failed_count());
        println!();
    }
}

fn export_transcript(transcript: &Transcript, path: &Path) -> Result<()> {
    let json = transcript.to_json().context("Failed to serialize transcript")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
