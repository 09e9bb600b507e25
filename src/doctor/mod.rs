//! Doctor command for setup diagnostics
//!
//! Checks everything a question depends on before one is asked.

use colored::*;
use qdrant_client::Qdrant;
use std::time::Duration;
use sysinfo::System;

use crate::config::{Config, LlmProvider};
use crate::llm;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    pub detail: Option<String>,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    config: Config,
}

impl Doctor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run all health checks
    pub async fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let mut checks = vec![self.check_config(), self.check_api_key()];

        checks.push(self.check_language_model().await);
        checks.extend(self.check_index().await);
        checks.push(self.check_persist_dir());
        checks.push(self.check_memory());

        checks
    }

    fn check_config(&self) -> HealthCheck {
        match self.config.validate() {
            Ok(()) => HealthCheck::new("Configuration", HealthStatus::Pass),
            Err(e) => HealthCheck::new("Configuration", HealthStatus::Fail(e.to_string())),
        }
    }

    fn check_api_key(&self) -> HealthCheck {
        let llm = &self.config.llm;
        if llm.provider == LlmProvider::Ollama {
            return HealthCheck::new("API Key", HealthStatus::Pass)
                .with_detail("not required for ollama");
        }

        match llm.api_key() {
            Some(_) => HealthCheck::new("API Key", HealthStatus::Pass)
                .with_detail(format!("${} set", llm.api_key_env)),
            None => HealthCheck::new(
                "API Key",
                HealthStatus::Fail(format!("${} is not set", llm.api_key_env)),
            ),
        }
    }

    async fn check_language_model(&self) -> HealthCheck {
        let model = match llm::from_config(&self.config.llm) {
            Ok(model) => model,
            Err(e) => return HealthCheck::new("Language Model", HealthStatus::Fail(e.to_string())),
        };

        let reachable = tokio::time::timeout(HEALTH_CHECK_TIMEOUT, model.health_check())
            .await
            .unwrap_or(false);

        if reachable {
            HealthCheck::new("Language Model", HealthStatus::Pass).with_detail(model.model())
        } else {
            HealthCheck::new(
                "Language Model",
                HealthStatus::Fail(format!("{} not reachable", self.config.llm.base_url)),
            )
        }
    }

    /// Reachability plus collection presence
    async fn check_index(&self) -> Vec<HealthCheck> {
        let index = &self.config.index;

        let client = match Qdrant::from_url(&index.url).timeout(HEALTH_CHECK_TIMEOUT).build() {
            Ok(client) => client,
            Err(e) => {
                return vec![HealthCheck::new(
                    "Vector Index",
                    HealthStatus::Fail(format!("Invalid index URL: {}", e)),
                )]
            }
        };

        if let Err(e) = client.health_check().await {
            return vec![HealthCheck::new(
                "Vector Index",
                HealthStatus::Fail(format!("{} not reachable: {}", index.url, e)),
            )];
        }
        let mut checks =
            vec![HealthCheck::new("Vector Index", HealthStatus::Pass).with_detail(&index.url)];

        let collection = index.collection.as_str();
        let check = match client.collection_exists(collection).await {
            Ok(true) => {
                let points = client
                    .collection_info(collection)
                    .await
                    .ok()
                    .and_then(|info| info.result)
                    .and_then(|info| info.points_count)
                    .unwrap_or(0);
                if points == 0 {
                    HealthCheck::new(
                        "Collection",
                        HealthStatus::Warn(format!("'{}' is empty", collection)),
                    )
                } else {
                    HealthCheck::new("Collection", HealthStatus::Pass)
                        .with_detail(format!("'{}' holds {} chunks", collection, points))
                }
            }
            Ok(false) => HealthCheck::new(
                "Collection",
                HealthStatus::Fail(format!(
                    "'{}' not found, run `pdfbuddy ingest <pdf>`",
                    collection
                )),
            ),
            Err(e) => HealthCheck::new("Collection", HealthStatus::Fail(e.to_string())),
        };
        checks.push(check);

        checks
    }

    fn check_persist_dir(&self) -> HealthCheck {
        let index = &self.config.index;
        let path = index.persist_dir.display().to_string();

        if index.persist_dir.exists() {
            HealthCheck::new("Index Directory", HealthStatus::Pass).with_detail(path)
        } else if index.require_persist_dir {
            HealthCheck::new("Index Directory", HealthStatus::Fail(format!("{} missing", path)))
        } else {
            HealthCheck::new("Index Directory", HealthStatus::Warn(format!("{} missing", path)))
        }
    }

    /// The embedding model and its tokenizer live in memory
    fn check_memory(&self) -> HealthCheck {
        let mut sys = System::new();
        sys.refresh_memory();

        let available_mb = sys.available_memory() / (1024 * 1024);

        if available_mb < 256 {
            HealthCheck::new(
                "Memory",
                HealthStatus::Fail(format!("Only {} MB RAM available", available_mb)),
            )
        } else if available_mb < 1024 {
            HealthCheck::new(
                "Memory",
                HealthStatus::Warn(format!("Low memory ({} MB available)", available_mb)),
            )
        } else {
            HealthCheck::new("Memory", HealthStatus::Pass)
                .with_detail(format!("{} MB available", available_mb))
        }
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\n{}\n", "PdfBuddy Diagnostics".bold().cyan());
        println!("{:<20} Status", "Check");
        println!("{}", "=".repeat(60));

        for check in checks {
            let status = match &check.status {
                HealthStatus::Pass => "PASS".green().to_string(),
                HealthStatus::Warn(msg) => format!("WARN: {}", msg).yellow().to_string(),
                HealthStatus::Fail(msg) => format!("FAIL: {}", msg).red().to_string(),
            };

            match &check.detail {
                Some(detail) => println!("{:<20} {} {}", check.name, status, detail.dimmed()),
                None => println!("{:<20} {}", check.name, status),
            }
        }

        println!();
    }

    /// True when no check failed
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}
