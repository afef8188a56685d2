use thiserror::Error;

use crate::llm::CompletionError;

#[derive(Debug, Error)]
pub enum EqgenError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Age must be between 12 and 18 (got {0})")]
    InvalidAge(i64),

    #[error("Provider must be either 'ollama' or 'deepseek' (got '{0}')")]
    InvalidProvider(String),

    #[error("DEEPSEEK_API_KEY not configured. Please set it in your environment variables.")]
    MissingApiKey,

    #[error("Test not found: {0}")]
    JobNotFound(String),

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl EqgenError {
    /// Whether the error was caused by caller input rather than the service.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EqgenError::InvalidAge(_)
                | EqgenError::InvalidProvider(_)
                | EqgenError::MissingApiKey
        )
    }
}
