pub mod client;
pub mod error;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use crate::state_machine::Provider;

pub use client::CompletionClient;
pub use error::CompletionError;

/// Anything that can turn a prompt into raw completion text.
///
/// [`CompletionClient`] talks to the real backends; tests drive the
/// orchestrator with in-memory doubles.
pub trait TextCompleter: Send + Sync {
    fn complete(
        &self,
        prompt: &str,
        provider: Provider,
    ) -> impl Future<Output = Result<String, CompletionError>> + Send;
}

impl<T: TextCompleter> TextCompleter for Arc<T> {
    fn complete(
        &self,
        prompt: &str,
        provider: Provider,
    ) -> impl Future<Output = Result<String, CompletionError>> + Send {
        (**self).complete(prompt, provider)
    }
}
