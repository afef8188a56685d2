//! On-disk layout for finished tests: `<root>/<age>/<DD_MM_YYYY>_<id8>.txt`.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, warn};

use crate::state_machine::{Job, MAX_AGE, MIN_AGE};

/// Characters of the job id kept in the file name.
const ID_PREFIX_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Invalid test id format: {0}")]
    InvalidJobId(String),

    #[error("Invalid age parameter: {0}")]
    InvalidAge(u8),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Whether `id` is non-empty and made only of ASCII letters, digits, `-` and `_`.
pub fn is_safe_job_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[derive(Debug, Clone)]
pub struct TestArchive {
    root: PathBuf,
}

impl TestArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where the test for `job_id` would be written on `date`.
    pub fn path_for(&self, job_id: &str, age: u8, date: NaiveDate) -> Result<PathBuf, ArchiveError> {
        if !is_safe_job_id(job_id) {
            return Err(ArchiveError::InvalidJobId(job_id.to_string()));
        }
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(ArchiveError::InvalidAge(age));
        }

        // Safe ids are ASCII, so byte slicing stays on char boundaries.
        let prefix = &job_id[..job_id.len().min(ID_PREFIX_LEN)];
        let file_name = format!("{}_{prefix}.txt", date.format("%d_%m_%Y"));
        Ok(self.root.join(age.to_string()).join(file_name))
    }

    /// Write `content` under today's local date and return the path.
    pub async fn write(&self, job_id: &str, age: u8, content: &str) -> Result<PathBuf, ArchiveError> {
        let path = self.path_for(job_id, age, Local::now().date_naive())?;

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| ArchiveError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| ArchiveError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), bytes = content.len(), "test written");
        Ok(path)
    }

    /// Delete the files of evicted jobs. Failures are logged, never returned.
    pub async fn remove_files(&self, jobs: &[Job]) {
        for job in jobs {
            if let Some(path) = job.file_path() {
                self.remove(&job.id, path).await;
            }
        }
    }

    /// Delete one written test. A missing file is not an error.
    pub async fn remove(&self, job_id: &str, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(job_id, path = %path.display(), "removed test"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(job_id, path = %path.display(), error = %e, "could not remove test"),
        }
    }
}
