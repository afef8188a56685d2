use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EqgenError;

use super::branch::Branch;

pub const MIN_AGE: u8 = 12;
pub const MAX_AGE: u8 = 18;

/// Checks that a requested age is within the supported 12–18 window.
pub fn check_age(age: i64) -> Result<u8, EqgenError> {
    if (i64::from(MIN_AGE)..=i64::from(MAX_AGE)).contains(&age) {
        Ok(age as u8)
    } else {
        Err(EqgenError::InvalidAge(age))
    }
}

/// Text-completion backend a job is generated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Local Ollama inference server.
    Ollama,
    /// Hosted DeepSeek chat-completions API.
    Deepseek,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::Deepseek => "deepseek",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = EqgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Provider::Ollama),
            "deepseek" => Ok(Provider::Deepseek),
            _ => Err(EqgenError::InvalidProvider(s.to_string())),
        }
    }
}

/// Where in the pipeline a job failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureStage {
    /// Rejected before the first branch call.
    Setup,
    /// A branch completion call failed or came back empty.
    Section(Branch),
    /// All branches generated but the assembled test is malformed.
    Validation,
    /// The validated test could not be written to disk.
    Persist,
}

/// Lifecycle of a job. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Generating { last_branch: Option<Branch> },
    Completed { file_path: PathBuf },
    Failed { stage: FailureStage, reason: String },
}

/// Coarse status exposed to pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Generating,
    Completed,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Generating => write!(f, "generating"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One attempt to generate a complete four-branch test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub age: u8,
    pub provider: Provider,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(age: u8, provider: Provider) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            age,
            provider,
            state: JobState::Generating { last_branch: None },
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        match self.state {
            JobState::Generating { .. } => JobStatus::Generating,
            JobState::Completed { .. } => JobStatus::Completed,
            JobState::Failed { .. } => JobStatus::Failed,
        }
    }

    #[cfg(test)]
    pub fn is_terminal(&self) -> bool {
        self.status() != JobStatus::Generating
    }

    /// Human-readable progress descriptor.
    pub fn progress(&self) -> String {
        match &self.state {
            JobState::Generating { last_branch: None } => format!("0/{}", Branch::ALL.len()),
            JobState::Generating {
                last_branch: Some(branch),
            } => format!(
                "Completed branch {}/{}: {}",
                branch.number(),
                Branch::ALL.len(),
                branch.title()
            ),
            JobState::Completed { .. } => "completed".to_string(),
            JobState::Failed {
                stage: FailureStage::Validation,
                ..
            } => "validation_failed".to_string(),
            JobState::Failed { .. } => "failed".to_string(),
        }
    }

    pub fn current_section(&self) -> String {
        match &self.state {
            JobState::Generating { last_branch: None } => "initializing".to_string(),
            JobState::Generating {
                last_branch: Some(branch),
            } => branch.key().to_string(),
            JobState::Completed { .. } => "completed".to_string(),
            JobState::Failed { stage, .. } => match stage {
                FailureStage::Setup => "initializing".to_string(),
                FailureStage::Section(branch) => branch.key().to_string(),
                FailureStage::Validation => "validation".to_string(),
                FailureStage::Persist => "persist".to_string(),
            },
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        match &self.state {
            JobState::Completed { file_path } => Some(file_path),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            JobState::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Flat, string-shaped view of a job served to pollers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub test_id: String,
    pub age: u8,
    pub status: JobStatus,
    pub progress: String,
    pub current_section: String,
    pub provider: Provider,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub file_path: Option<String>,
    pub error: Option<String>,
}

impl From<&Job> for JobSnapshot {
    fn from(job: &Job) -> Self {
        Self {
            test_id: job.id.clone(),
            age: job.age,
            status: job.status(),
            progress: job.progress(),
            current_section: job.current_section(),
            provider: job.provider,
            created_at: job.created_at,
            completed_at: job.completed_at,
            file_path: job.file_path().map(|p| p.display().to_string()),
            error: job.error().map(str::to_string),
        }
    }
}
