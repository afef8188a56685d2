mod branch;
mod job;
mod state;

pub use branch::Branch;
pub use job::{
    FailureStage, Job, JobSnapshot, JobState, JobStatus, MAX_AGE, MIN_AGE, Provider, check_age,
};
pub use state::{JobEvent, StateMachine, Transition};
