//! Command-line argument parsing for PdfBuddy
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// PdfBuddy - Ask grounded questions about a PDF
#[derive(Parser, Debug)]
#[command(name = "pdfbuddy")]
#[command(version)]
#[command(about = "Ask grounded questions about a PDF from your terminal", long_about = None)]
pub struct Args {
    /// Configuration file path (default: ~/.pdfbuddy/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Single search with the question only (no expansion, dedup or cap)
    #[arg(long, global = true)]
    pub simple: bool,

    /// Verbosity level: -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only print answers and errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer one question and exit
    Ask {
        /// The question to answer
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Print the answer record as JSON
        #[arg(long)]
        json: bool,

        /// Also print the retrieved context chunks
        #[arg(long)]
        show_context: bool,
    },

    /// Start interactive chat mode
    Chat,

    /// Load a document into the vector index
    Ingest {
        /// PDF, text or markdown file
        #[arg(value_name = "PATH", default_value = "./data/Ebook-Agentic-AI.pdf")]
        path: PathBuf,
    },

    /// Run setup diagnostics and health checks
    Doctor,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
