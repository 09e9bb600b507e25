//! Terminal output for answers, sources and progress
//!
//! Shared by `ask` and chat mode so both render a record the same way.

use colored::*;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

use crate::rag::{AnswerRecord, ParseStatus};

/// Message shown when retrieval produced nothing to cite
pub const NO_SOURCES_MESSAGE: &str = "No relevant segments found in the PDF.";

/// Display manager for answers and progress
pub struct DisplayManager {
    current_bar: Option<ProgressBar>,
    update_interval: Duration,
    show_progress: bool,
}

impl DisplayManager {
    pub fn new() -> Self {
        DisplayManager {
            current_bar: None,
            update_interval: Duration::from_millis(100),
            show_progress: true,
        }
    }

    /// Disable spinners (quiet mode, piped output)
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Show welcome banner for chat mode
    pub fn show_banner(&self, version: &str, model: &str, collection: &str) {
        let width = 64;
        let rule = "=".repeat(width).cyan();
        let title = format!("  PdfBuddy {} - Ask your document", version);
        let info = format!("  Model: {} | Collection: {}", model, collection);

        println!("\n{}", rule);
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", rule);
        println!(
            "Ask a question (or {} for commands, {} to quit)\n",
            "/help".green(),
            "/exit".green()
        );
    }

    /// Start the retrieval spinner
    pub fn start_search(&mut self) {
        self.finish_current();
        if !self.show_progress {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Searching the document...");
        pb.enable_steady_tick(self.update_interval);
        self.current_bar = Some(pb);
    }

    /// Stop the current spinner, if any
    pub fn finish_current(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_and_clear();
        }
    }

    pub fn is_busy(&self) -> bool {
        self.current_bar.is_some()
    }

    /// Render an answer with its confidence and, optionally, the chunks it was built from
    pub fn show_answer(&mut self, record: &AnswerRecord, show_context: bool) {
        self.finish_current();

        println!("\n{}", "Answer".bold().green());
        println!("{}", "-".repeat(60).green());
        println!("{}\n", record.answer);
        println!(
            "{} {}",
            "Confidence Score:".bold(),
            format_score(record.confidence_score)
        );
        if record.parse_status != ParseStatus::Parsed {
            println!(
                "{}",
                format!("(model reply was not in the expected format: {:?})", record.parse_status)
                    .dimmed()
            );
        }

        if show_context {
            self.show_sources(&record.context_chunks);
        }
        println!();
    }

    /// Numbered list of source chunks
    pub fn show_sources(&self, chunks: &[String]) {
        println!("\n{}", "Sources".bold().cyan());
        println!("{}", "-".repeat(60).cyan());

        if chunks.is_empty() {
            println!("{}", NO_SOURCES_MESSAGE.yellow());
            return;
        }

        for (i, chunk) in chunks.iter().enumerate() {
            println!("{}", format!("Source Chunk {}", i + 1).bold());
            println!("{}\n", chunk.dimmed());
        }
    }

    /// Non-fatal error; the session carries on
    pub fn show_error(&mut self, error: &str) {
        self.finish_current();
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    pub fn show_warning(&self, warning: &str) {
        println!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0))
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Confidence score coloured by band
pub fn format_score(score: f64) -> ColoredString {
    let text = format!("{:.2}", score);
    if score >= 0.75 {
        text.green()
    } else if score >= 0.4 {
        text.yellow()
    } else {
        text.red()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(chunks: Vec<String>, status: ParseStatus) -> AnswerRecord {
        AnswerRecord {
            question: "What is task decomposition?".to_string(),
            answer: "Splitting a goal into steps.".to_string(),
            context_chunks: chunks,
            confidence_score: 0.9,
            parse_status: status,
        }
    }

    #[test]
    fn test_display_manager_creation() {
        let manager = DisplayManager::new();
        assert!(!manager.is_busy());
        assert_eq!(manager.update_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_spinner_lifecycle() {
        let mut manager = DisplayManager::new();
        manager.start_search();
        assert!(manager.is_busy());

        manager.finish_current();
        assert!(!manager.is_busy());
    }

    #[test]
    fn test_quiet_mode_has_no_spinner() {
        let mut manager = DisplayManager::new().without_progress();
        manager.start_search();
        assert!(!manager.is_busy());
    }

    #[test]
    fn test_show_answer_finishes_spinner() {
        let mut manager = DisplayManager::new();
        manager.start_search();
        manager.show_answer(&record(vec!["chunk one".to_string()], ParseStatus::Parsed), true);
        assert!(!manager.is_busy());
    }

    #[test]
    fn test_show_answer_without_sources() {
        let mut manager = DisplayManager::new();
        manager.show_answer(&record(Vec::new(), ParseStatus::NoMarkers), true);
        manager.show_sources(&[]);
    }

    #[test]
    fn test_show_error_finishes_spinner() {
        let mut manager = DisplayManager::new();
        manager.start_search();
        manager.show_error("vector search timed out after 15000ms");
        assert!(!manager.is_busy());
    }

    #[test]
    fn test_format_score_text() {
        assert!(format_score(0.9).to_string().contains("0.90"));
        assert!(format_score(0.0).to_string().contains("0.00"));
        assert!(format_score(0.5).to_string().contains("0.50"));
    }
}
