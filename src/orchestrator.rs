use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::archive::{ArchiveError, TestArchive};
use crate::llm::{CompletionError, TextCompleter};
use crate::prompts::section_prompts;
use crate::sanitize::strip_reasoning;
use crate::state_machine::{
    Branch, FailureStage, JobEvent, JobState, MAX_AGE, MIN_AGE, Provider, StateMachine,
    Transition,
};
use crate::store::{JobStore, RetentionPolicy};
use crate::validator::{ValidationReport, validate};

/// Why a generation run stopped.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Age must be between 12 and 18 (got {0})")]
    InvalidAge(u8),

    #[error("Failed to generate section {}: {source}", .branch.key())]
    Section {
        branch: Branch,
        source: CompletionError,
    },

    #[error("Failed to generate section {}: model returned no content", .0.key())]
    EmptySection(Branch),

    #[error("Schema validation failed: {}", .0.summary())]
    Schema(ValidationReport),

    #[error("Failed to save test: {0}")]
    Persist(#[from] ArchiveError),

    #[error("Failed to save test: job was removed before it completed")]
    Discarded,
}

impl GenerationError {
    pub fn stage(&self) -> FailureStage {
        match self {
            GenerationError::InvalidAge(_) => FailureStage::Setup,
            GenerationError::Section { branch, .. } | GenerationError::EmptySection(branch) => {
                FailureStage::Section(*branch)
            }
            GenerationError::Schema(_) => FailureStage::Validation,
            GenerationError::Persist(_) | GenerationError::Discarded => FailureStage::Persist,
        }
    }
}

/// Drives one job through the four branch calls, validation and persistence.
///
/// The generator only holds job ids; every state change goes through the
/// store so pollers see progress as soon as a branch lands.
pub struct Generator<C, S> {
    completer: C,
    store: Arc<S>,
    archive: TestArchive,
    retention: RetentionPolicy,
}

impl<C: TextCompleter, S: JobStore> Generator<C, S> {
    pub fn new(completer: C, store: Arc<S>, archive: TestArchive, retention: RetentionPolicy) -> Self {
        Self {
            completer,
            store,
            archive,
            retention,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run a job to completion, recording every failure on the job instead of
    /// returning it.
    pub async fn execute(&self, job_id: &str, age: u8, provider: Provider) {
        match self.run(job_id, age, provider).await {
            Ok(path) => info!(job_id, path = %path.display(), "test generated"),
            Err(e) => {
                warn!(job_id, error = %e, "generation failed");
                self.record(
                    job_id,
                    JobEvent::Failed {
                        stage: e.stage(),
                        reason: e.to_string(),
                    },
                );
            }
        }
    }

    /// Generate, validate and persist a test for `job_id`.
    ///
    /// On success the job is marked completed, the store is trimmed to the
    /// retention policy and the written path is returned. Nothing is written
    /// to disk unless every branch succeeded and the test validated.
    pub async fn run(
        &self,
        job_id: &str,
        age: u8,
        provider: Provider,
    ) -> Result<PathBuf, GenerationError> {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(GenerationError::InvalidAge(age));
        }
        info!(job_id, age, %provider, "generation started");

        let mut content = String::new();
        for prompt in section_prompts(age) {
            let branch = prompt.branch;
            debug!(job_id, branch = branch.key(), "requesting section");

            let raw = self
                .completer
                .complete(&prompt.text, provider)
                .await
                .map_err(|source| GenerationError::Section { branch, source })?;

            let section = strip_reasoning(&raw);
            if section.trim().is_empty() {
                return Err(GenerationError::EmptySection(branch));
            }
            content.push_str(&section);
            content.push_str("\n\n");

            self.record(job_id, JobEvent::BranchCompleted(branch));
            debug!(job_id, branch = branch.key(), bytes = section.len(), "section complete");
        }

        let report = validate(&content);
        if !report.ok {
            return Err(GenerationError::Schema(report));
        }

        let file_path = self.archive.write(job_id, age, &content).await?;
        let recorded = self.record(
            job_id,
            JobEvent::Completed {
                file_path: file_path.clone(),
            },
        );
        if !recorded {
            // Evicted or already failed: the file has no owner.
            self.archive.remove(job_id, &file_path).await;
            return Err(GenerationError::Discarded);
        }

        let evicted = self.store.evict(&self.retention, Utc::now());
        if !evicted.is_empty() {
            info!(count = evicted.len(), "evicted old tests");
            self.archive.remove_files(&evicted).await;
        }

        Ok(file_path)
    }

    /// Fail a job whose worker died without reporting. The failure is pinned
    /// to the branch that was in progress.
    pub fn abandon(&self, job_id: &str, reason: String) {
        self.store.update(job_id, |job| {
            let JobState::Generating { last_branch } = job.state else {
                return;
            };
            let stage = match last_branch.map_or(Some(Branch::Perceiving), |b| b.next()) {
                Some(branch) => FailureStage::Section(branch),
                None => FailureStage::Validation,
            };
            StateMachine::apply(job, JobEvent::Failed { stage, reason }, Utc::now());
        });
    }

    /// Apply `event` to the stored job. False if the job is gone or the
    /// event was ignored.
    fn record(&self, job_id: &str, event: JobEvent) -> bool {
        let applied = self
            .store
            .update(job_id, |job| StateMachine::apply(job, event, Utc::now()));
        match applied {
            None => {
                warn!(job_id, "job no longer in store");
                false
            }
            Some(Transition::Ignored) => {
                warn!(job_id, "event ignored for job");
                false
            }
            Some(_) => true,
        }
    }
}
