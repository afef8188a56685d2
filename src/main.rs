mod archive;
mod cli;
mod config;
mod error;
mod http;
mod llm;
mod logging;
mod orchestrator;
mod prompts;
mod sanitize;
mod service;
mod state_machine;
mod store;
#[cfg(test)]
mod test_support;
mod ui;
mod validator;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;

use cli::{Cli, Command};
use config::EqgenConfig;
use service::DefaultService;
use state_machine::{Branch, JobStatus, check_age};

/// How often `generate` polls its own job.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EqgenConfig::load_from(path, |key| std::env::var(key).ok())
            .with_context(|| format!("loading {}", path.display()))?,
        None => EqgenConfig::load()?,
    };
    logging::init(cli.verbose || config.debug);

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            let service = Arc::new(DefaultService::from_config(&config)?);
            http::router::serve(service, &config.bind_addr()).await
        }
        Command::Generate { age, provider } => generate(&config, age, provider.as_deref()).await,
        Command::Prompts { age, branch } => {
            let age = check_age(age)?;
            for prompt in prompts::section_prompts(age) {
                if branch.is_some_and(|n| usize::from(n) != prompt.branch.number()) {
                    continue;
                }
                println!("{}", ui::prompt_heading(&prompt.branch.header()));
                println!("{}", prompt.text);
            }
            Ok(())
        }
        Command::Validate { file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .map_err(error::EqgenError::from)
                .with_context(|| format!("reading {}", file.display()))?;
            let report = validator::validate(&content);
            ui::print_report(&file.display().to_string(), &report);
            if !report.ok {
                bail!("{} is not a well-formed test", file.display());
            }
            Ok(())
        }
    }
}

/// Run one job in-process, showing progress until it finishes.
async fn generate(config: &EqgenConfig, age: i64, provider: Option<&str>) -> Result<()> {
    let service = DefaultService::from_config(config)?;
    let receipt = service.submit(age, provider)?;

    let first = service.poll(&receipt.test_id)?;
    let progress = ui::GenerationProgress::start(first.age, receipt.provider);

    let snapshot = loop {
        let snapshot = service.poll(&receipt.test_id)?;
        if snapshot.status != JobStatus::Generating {
            break snapshot;
        }
        progress.update(&snapshot);
        tokio::time::sleep(POLL_INTERVAL).await;
    };

    progress.finish(&snapshot);
    ui::print_snapshot(&snapshot);

    if snapshot.status == JobStatus::Failed {
        bail!(
            "generation failed after {} of {} branches",
            completed_branches(&snapshot.current_section),
            Branch::ALL.len()
        );
    }
    Ok(())
}

/// Branches finished before a failure recorded against `current_section`.
fn completed_branches(current_section: &str) -> usize {
    if current_section == "initializing" {
        return 0;
    }
    Branch::ALL
        .iter()
        .find(|b| b.key() == current_section)
        .map_or(Branch::ALL.len(), |b| b.number() - 1)
}
