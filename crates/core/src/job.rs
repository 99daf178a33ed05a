// crates/core/src/job.rs
//! The job record and its lifecycle state machine.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Base name prefix shared by every artifact this service produces.
pub const ARTIFACT_PREFIX: &str = "logpack";

/// Extension of the archive the collector writes.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Lifecycle state of a collection job.
///
/// `InProgress` is the only non-terminal state. A job moves to `Done` when
/// the collector exits successfully, or to `Failed` (with the error recorded
/// on the record) when it cannot be launched or exits nonzero. Terminal
/// states never transition again, in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    InProgress,
    Done,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        self != JobState::InProgress
    }
}

/// One collection request and its lifecycle.
///
/// The download URL is intentionally not part of the record; it depends on
/// the host the client used to reach us and is recomputed per request by the
/// API layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Opaque id, unique for the process lifetime.
    pub id: String,
    /// Artifact base name (no extension): `logpack-<id>`.
    pub file_name: String,
    pub state: JobState,
    /// Collector error message, recorded only when `state` is `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Allocate a fresh in-progress job with a newly issued id.
    pub fn new() -> Self {
        let id = next_job_id();
        let file_name = format!("{ARTIFACT_PREFIX}-{id}");
        Self {
            id,
            file_name,
            state: JobState::InProgress,
            error: None,
        }
    }

    /// Rebuild a record for an artifact that already exists on disk.
    ///
    /// Used only by startup reconciliation; the archive is present, so the
    /// job is created directly in `Done`.
    pub fn from_existing_artifact(id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            state: JobState::Done,
            error: None,
        }
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

/// Full artifact file name for a job's base name: `<file_name>.zip`.
pub fn archive_file_name(file_name: &str) -> String {
    format!("{file_name}.{ARCHIVE_EXTENSION}")
}

/// Last id issued by [`next_job_id`], kept strictly increasing.
static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Issue a process-unique job id.
///
/// Ids are nanosecond creation timestamps, which also makes them the stable
/// suffix of the artifact file name. Two creations can race within the clock
/// resolution, so the candidate is bumped past the last issued id under a
/// compare-exchange loop: ids are strictly increasing and never collide.
pub fn next_job_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0);

    let mut prev = LAST_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(prev + 1);
        match LAST_ID.compare_exchange_weak(prev, candidate, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return candidate.to_string(),
            Err(observed) => prev = observed,
        }
    }
}
