//! PdfBuddy - Main CLI Entry Point

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use pdfbuddy::{
    bootstrap::{Bootstrap, Collaborators},
    cli::{Args, Commands},
    config::Config,
    doctor::Doctor,
    errors::RagError,
    ingest::Ingestor,
    rag::PipelineConfig,
    repl::{ChatConfig, ChatSession, DisplayManager},
    telemetry,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    telemetry::init(args.verbosity());

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if args.simple {
        config.pipeline = PipelineConfig::simple();
    }

    match &args.command {
        Commands::Ask {
            question,
            json,
            show_context,
        } => run_ask(&args, config, question, *json, *show_context).await,
        Commands::Chat => run_chat(&args, config).await,
        Commands::Ingest { path } => run_ingest(&args, config, path).await,
        Commands::Doctor => run_doctor(config).await,
        Commands::Config => show_config(&args, &config),
    }
}

/// Build collaborators or exit with a setup hint
async fn preflight(bootstrap: &Bootstrap) -> Collaborators {
    match bootstrap.for_questions().await {
        Ok(collaborators) => collaborators,
        Err(e) => exit_with(&e),
    }
}

fn exit_with(error: &RagError) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), error);
    if error.is_setup() {
        eprintln!(
            "\n{} Ingest the document first: {}",
            "Hint:".yellow().bold(),
            "pdfbuddy ingest <pdf>".cyan()
        );
        eprintln!("Run {} for a full health check.", "pdfbuddy doctor".cyan());
        std::process::exit(2);
    }
    std::process::exit(1);
}

async fn run_ask(
    args: &Args,
    config: Config,
    question: &str,
    json: bool,
    show_context: bool,
) -> Result<()> {
    let bootstrap = Bootstrap::new(config);
    let collaborators = preflight(&bootstrap).await;
    let pipeline = bootstrap.pipeline(&collaborators);

    let mut display = if args.verbosity().show_progress() && !json {
        DisplayManager::new()
    } else {
        DisplayManager::new().without_progress()
    };

    display.start_search();
    let record = match pipeline.ask(question).await {
        Ok(record) => record,
        Err(e) => {
            display.finish_current();
            exit_with(&e);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        display.show_answer(&record, show_context);
    }

    Ok(())
}

async fn run_chat(args: &Args, config: Config) -> Result<()> {
    let bootstrap = Bootstrap::new(config);
    let collaborators = preflight(&bootstrap).await;
    let pipeline = bootstrap.pipeline(&collaborators);

    let mut session = ChatSession::new(ChatConfig {
        history_file: ChatConfig::default_history_file(),
        show_progress: args.verbosity().show_progress(),
        show_context: true,
    })?;

    session.show_welcome(
        VERSION,
        collaborators.llm.model(),
        &bootstrap.config().index.collection,
    );
    session.run(&pipeline).await
}

async fn run_ingest(args: &Args, config: Config, path: &std::path::Path) -> Result<()> {
    let ingest_config = config.ingest.clone();
    let bootstrap = Bootstrap::new(config);

    let index = match bootstrap.for_ingest().await {
        Ok(index) => index,
        Err(e) => exit_with(&e),
    };

    let spinner = if args.verbosity().show_progress() {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Ingesting {}...", path.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = Ingestor::new(index.clone(), &ingest_config).run(path).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let report = match result {
        Ok(report) => report,
        Err(e) => exit_with(&e),
    };
    let total = index.count().await.unwrap_or(0);

    println!(
        "{} Ingested {} ({} pages, {} chunks). Collection '{}' now holds {} chunks.",
        "✓".green(),
        path.display(),
        report.pages,
        report.chunks,
        bootstrap.config().index.collection,
        total
    );

    Ok(())
}

async fn run_doctor(config: Config) -> Result<()> {
    let doctor = Doctor::new(config);

    let checks = doctor.run_diagnostics().await;
    Doctor::display_results(&checks);

    std::process::exit(if Doctor::overall_status(&checks) { 0 } else { 1 });
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };

    println!("\n{}", "PdfBuddy Configuration".bold().cyan());
    println!("{}", format!("# {}", path.display()).dimmed());
    println!("{}", "=".repeat(60).cyan());
    println!("{}", toml::to_string_pretty(config)?);
    println!("{}", format!("Verbosity: {:?}", args.verbosity()).dimmed());

    Ok(())
}
