//! Fixtures and completion doubles shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::llm::{CompletionError, TextCompleter};
use crate::state_machine::{Branch, Provider};

/// One well-formed branch: header, three questions, options A-E, full scores.
pub fn branch_text(branch: Branch) -> String {
    let topic = branch.title().to_lowercase();
    let questions: Vec<String> = (1..=3)
        .map(|n| {
            format!(
                "Question {n}\n\n\
                 Scenario & Question: [Age 15] Scenario {n} about {topic}. Which response fits best?\n\n\
                 Options:\n\
                 A) First choice\n\
                 B) Second choice\n\
                 C) Third choice\n\
                 D) Fourth choice\n\
                 E) Fifth choice\n\n\
                 Expert Consensus Scores: A: 1, B: 5, C: 3, D: 2, E: 1"
            )
        })
        .collect();
    format!("{}\n\n{}", branch.header(), questions.join("\n\n"))
}

/// All four branches, as the orchestrator assembles them.
pub fn full_test() -> String {
    Branch::ALL
        .iter()
        .map(|b| branch_text(*b))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The branch a prompt was built for.
fn branch_for_prompt(prompt: &str) -> Option<Branch> {
    Branch::ALL
        .into_iter()
        .find(|b| prompt.contains(&b.header()))
}

type CallHook = Box<dyn Fn(usize) + Send + Sync>;

/// Replies from a fixed script, one entry per call, and records prompts.
pub struct ScriptedCompleter {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    prompts: Mutex<Vec<String>>,
    on_call: Option<CallHook>,
}

impl ScriptedCompleter {
    pub fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            on_call: None,
        }
    }

    /// Replies with each branch's well-formed text, optionally wrapped.
    pub fn well_formed(wrap: impl Fn(String) -> String) -> Self {
        Self::new(
            Branch::ALL
                .iter()
                .map(|b| Ok(wrap(branch_text(*b))))
                .collect(),
        )
    }

    /// Run `hook` with the zero-based call index before each reply.
    pub fn with_hook(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_call = Some(Box::new(hook));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl TextCompleter for ScriptedCompleter {
    async fn complete(&self, prompt: &str, _provider: Provider) -> Result<String, CompletionError> {
        let index = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };
        if let Some(hook) = &self.on_call {
            hook(index);
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(CompletionError::ApiError {
                    status: 500,
                    message: "script exhausted".into(),
                })
            })
    }
}

/// Answers every prompt with the well-formed text for its branch, after an
/// optional delay, and tracks how many calls overlap.
#[derive(Default)]
pub struct EchoCompleter {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl EchoCompleter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Highest number of simultaneous calls seen.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextCompleter for EchoCompleter {
    async fn complete(&self, prompt: &str, _provider: Provider) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        branch_for_prompt(prompt)
            .map(branch_text)
            .ok_or_else(|| CompletionError::InvalidResponse {
                backend: "echo",
                detail: "prompt names no branch".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::section_prompts;
    use crate::validator::validate;

    #[test]
    fn fixture_is_well_formed() {
        assert!(validate(&full_test()).ok);
    }

    #[test]
    fn each_prompt_maps_to_its_branch() {
        for prompt in section_prompts(15) {
            assert_eq!(branch_for_prompt(&prompt.text), Some(prompt.branch));
        }
    }
}
