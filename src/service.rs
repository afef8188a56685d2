//! Submit / poll / list / health, independent of transport.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::archive::TestArchive;
use crate::config::EqgenConfig;
use crate::error::EqgenError;
use crate::llm::{CompletionClient, TextCompleter};
use crate::orchestrator::Generator;
use crate::state_machine::{Job, JobSnapshot, JobStatus, Provider, check_age};
use crate::store::{InMemoryJobStore, JobStore, RetentionPolicy};

/// Returned as soon as a job is queued.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitReceipt {
    pub test_id: String,
    pub status: JobStatus,
    pub provider: Provider,
}

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

/// Owns the job store and a bounded pool of generation workers.
pub struct GenerationService<C, S> {
    generator: Arc<Generator<C, S>>,
    permits: Arc<Semaphore>,
    default_provider: Provider,
    has_deepseek_key: bool,
}

/// The service as wired for real backends.
pub type DefaultService = GenerationService<CompletionClient, InMemoryJobStore>;

impl DefaultService {
    pub fn from_config(config: &EqgenConfig) -> Result<Self, EqgenError> {
        let generator = Generator::new(
            CompletionClient::new(config)?,
            Arc::new(InMemoryJobStore::new()),
            TestArchive::new(config.output_dir.clone()),
            RetentionPolicy::from_config(config)?,
        );
        Ok(Self::new(generator, config))
    }
}

impl<C, S> GenerationService<C, S>
where
    C: TextCompleter + 'static,
    S: JobStore + 'static,
{
    pub fn new(generator: Generator<C, S>, config: &EqgenConfig) -> Self {
        Self {
            generator: Arc::new(generator),
            permits: Arc::new(Semaphore::new(config.workers.max(1))),
            default_provider: config.provider,
            has_deepseek_key: config.has_deepseek_key(),
        }
    }

    /// Validate a request and queue it. Nothing is stored when validation fails.
    ///
    /// `provider` defaults to the configured one and is matched
    /// case-insensitively.
    pub fn submit(&self, age: i64, provider: Option<&str>) -> Result<SubmitReceipt, EqgenError> {
        let age = check_age(age)?;
        let provider = match provider {
            Some(name) => name.parse()?,
            None => self.default_provider,
        };
        if provider == Provider::Deepseek && !self.has_deepseek_key {
            return Err(EqgenError::MissingApiKey);
        }

        let job = Job::new(age, provider);
        let receipt = SubmitReceipt {
            test_id: job.id.clone(),
            status: job.status(),
            provider,
        };
        self.generator.store().put(job);
        info!(job_id = %receipt.test_id, age, %provider, "test queued");

        self.spawn_worker(receipt.test_id.clone(), age, provider);
        Ok(receipt)
    }

    /// Waits for a pool permit in the background, then runs the job.
    fn spawn_worker(&self, job_id: String, age: u8, provider: Provider) {
        let generator = Arc::clone(&self.generator);
        let permits = Arc::clone(&self.permits);

        tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                error!(job_id = %job_id, "worker pool closed");
                return;
            };

            // Run on its own task so a panic still leaves a terminal record.
            let worker = {
                let generator = Arc::clone(&generator);
                let job_id = job_id.clone();
                tokio::spawn(async move { generator.execute(&job_id, age, provider).await })
            };
            if let Err(e) = worker.await {
                error!(job_id = %job_id, error = %e, "generation task aborted");
                generator.abandon(&job_id, format!("Generation task aborted: {e}"));
            }
        });
    }

    pub fn poll(&self, job_id: &str) -> Result<JobSnapshot, EqgenError> {
        self.generator
            .store()
            .get(job_id)
            .map(|job| JobSnapshot::from(&job))
            .ok_or_else(|| EqgenError::JobNotFound(job_id.to_string()))
    }

    pub fn list(&self) -> Vec<JobSnapshot> {
        self.generator
            .store()
            .list()
            .iter()
            .map(JobSnapshot::from)
            .collect()
    }

    pub fn health(&self) -> Health {
        Health {
            status: "healthy",
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
