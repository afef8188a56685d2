//! Job records, keyed by job id.
//!
//! [`JobStore`] is the seam the orchestrator and service are written against;
//! [`InMemoryJobStore`] is the only implementation. Every operation takes the
//! one table lock for its duration and never across an `.await`, and reads
//! hand out clones so callers never see a record mid-update.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::config::EqgenConfig;
use crate::error::EqgenError;
use crate::state_machine::Job;

/// How long finished work is kept and how much of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_age: Duration,
    pub max_jobs: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::hours(24),
            max_jobs: 100,
        }
    }
}

impl RetentionPolicy {
    pub fn from_config(config: &EqgenConfig) -> Result<Self, EqgenError> {
        Ok(Self {
            max_age: config.max_test_age()?,
            max_jobs: config.max_stored_tests,
        })
    }
}

pub trait JobStore: Send + Sync {
    /// A copy of the job, if present.
    fn get(&self, id: &str) -> Option<Job>;

    /// Insert or replace.
    fn put(&self, job: Job);

    /// Mutate a job in place under the store lock. `None` if the id is unknown.
    fn update<R>(&self, id: &str, f: impl FnOnce(&mut Job) -> R) -> Option<R>;

    fn delete(&self, id: &str) -> Option<Job>;

    /// Copies of every job, oldest first.
    fn list(&self) -> Vec<Job>;

    /// Apply `policy` as of `now` and return the removed jobs.
    ///
    /// Jobs older than `policy.max_age` go first; if more than
    /// `policy.max_jobs` remain, the oldest are dropped until at capacity.
    fn evict(&self, policy: &RetentionPolicy, now: DateTime<Utc>) -> Vec<Job>;
}

#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<HashMap<String, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl JobStore for InMemoryJobStore {
    fn get(&self, id: &str) -> Option<Job> {
        self.lock().get(id).cloned()
    }

    fn put(&self, job: Job) {
        self.lock().insert(job.id.clone(), job);
    }

    fn update<R>(&self, id: &str, f: impl FnOnce(&mut Job) -> R) -> Option<R> {
        self.lock().get_mut(id).map(f)
    }

    fn delete(&self, id: &str) -> Option<Job> {
        self.lock().remove(id)
    }

    fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.lock().values().cloned().collect();
        jobs.sort_by_key(|job| job.created_at);
        jobs
    }

    fn evict(&self, policy: &RetentionPolicy, now: DateTime<Utc>) -> Vec<Job> {
        let mut jobs = self.lock();
        // A window reaching past the earliest representable instant expires nothing.
        let cutoff = now.checked_sub_signed(policy.max_age);

        let expired: Vec<String> = jobs
            .values()
            .filter(|job| cutoff.is_some_and(|cutoff| job.created_at < cutoff))
            .map(|job| job.id.clone())
            .collect();
        let mut removed: Vec<Job> = expired.iter().filter_map(|id| jobs.remove(id)).collect();

        if jobs.len() > policy.max_jobs {
            let mut by_age: Vec<(DateTime<Utc>, String)> = jobs
                .values()
                .map(|job| (job.created_at, job.id.clone()))
                .collect();
            by_age.sort();
            let excess = jobs.len() - policy.max_jobs;
            for (_, id) in by_age.into_iter().take(excess) {
                if let Some(job) = jobs.remove(&id) {
                    removed.push(job);
                }
            }
        }

        removed
    }
}
