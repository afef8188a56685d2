use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::branch::Branch;
use super::job::{FailureStage, Job, JobState};

/// Something that happened to a job while it was being generated.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// A branch completion came back and was appended.
    BranchCompleted(Branch),
    /// The validated test was written to `file_path`.
    Completed { file_path: PathBuf },
    /// The pipeline gave up.
    Failed { stage: FailureStage, reason: String },
}

/// The result of applying an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Still generating; one more branch is done.
    Advanced,
    Completed,
    Failed,
    /// The event does not apply to the job's current state and was dropped.
    Ignored,
}

/// Drives a `Job` through `generating → {completed, failed}`.
pub struct StateMachine;

impl StateMachine {
    /// Apply `event` to `job`, returning the resulting transition.
    ///
    /// - Branches must complete in order; an out-of-order branch is ignored.
    /// - Completion is only accepted once all four branches are done.
    /// - Failure is accepted from any generating state.
    /// - Terminal jobs never change again.
    pub fn apply(job: &mut Job, event: JobEvent, now: DateTime<Utc>) -> Transition {
        let JobState::Generating { last_branch } = job.state else {
            return Transition::Ignored;
        };

        match event {
            JobEvent::BranchCompleted(branch) => {
                let expected = match last_branch {
                    None => Some(Branch::Perceiving),
                    Some(done) => done.next(),
                };
                if expected != Some(branch) {
                    return Transition::Ignored;
                }
                job.state = JobState::Generating {
                    last_branch: Some(branch),
                };
                Transition::Advanced
            }
            JobEvent::Completed { file_path } => {
                if last_branch != Some(Branch::Managing) {
                    return Transition::Ignored;
                }
                job.state = JobState::Completed { file_path };
                job.completed_at = Some(now);
                Transition::Completed
            }
            JobEvent::Failed { stage, reason } => {
                job.state = JobState::Failed { stage, reason };
                job.completed_at = Some(now);
                Transition::Failed
            }
        }
    }
}
