// crates/core/src/registry.rs
//! Concurrency-safe registry of collection jobs.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::job::{Job, JobState};

/// The authoritative in-memory map of jobs, keyed by id.
///
/// Values go in and come out by copy; nothing shared-mutable escapes the
/// lock, and the lock is scoped to map operations only — it is never held
/// across process execution or file I/O. Completion and failure are exposed
/// as atomic operations rather than get-then-insert so that a collector
/// finishing after its job was deleted is a no-op instead of a resurrection.
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or overwrite the record at its id.
    pub fn insert(&self, job: Job) {
        match self.jobs.write() {
            Ok(mut jobs) => {
                jobs.insert(job.id.clone(), job);
            }
            Err(e) => tracing::error!("job registry lock poisoned on insert: {e}"),
        }
    }

    /// Copy-out lookup; `None` means no such job.
    pub fn get(&self, id: &str) -> Option<Job> {
        match self.jobs.read() {
            Ok(jobs) => jobs.get(id).cloned(),
            Err(e) => {
                tracing::error!("job registry lock poisoned on get: {e}");
                None
            }
        }
    }

    /// Atomically remove and return the prior record, if present.
    pub fn remove(&self, id: &str) -> Option<Job> {
        match self.jobs.write() {
            Ok(mut jobs) => jobs.remove(id),
            Err(e) => {
                tracing::error!("job registry lock poisoned on remove: {e}");
                None
            }
        }
    }

    /// Point-in-time copies of all records. Ordering is unspecified.
    pub fn snapshot(&self) -> Vec<Job> {
        match self.jobs.read() {
            Ok(jobs) => jobs.values().cloned().collect(),
            Err(e) => {
                tracing::error!("job registry lock poisoned on snapshot: {e}");
                Vec::new()
            }
        }
    }

    /// Mark the job done. Returns whether a record existed.
    ///
    /// Only an in-progress record transitions; terminal records are left
    /// untouched. A missing record (deleted while its collector ran) is a
    /// safe no-op.
    pub fn complete(&self, id: &str) -> bool {
        self.transition(id, JobState::Done, None)
    }

    /// Mark the job failed with the collector error recorded.
    /// Same no-op rules as [`complete`](Self::complete).
    pub fn fail(&self, id: &str, error: impl Into<String>) -> bool {
        self.transition(id, JobState::Failed, Some(error.into()))
    }

    fn transition(&self, id: &str, target: JobState, error: Option<String>) -> bool {
        match self.jobs.write() {
            Ok(mut jobs) => match jobs.get_mut(id) {
                Some(job) => {
                    if job.state == JobState::InProgress {
                        job.state = target;
                        job.error = error;
                    }
                    true
                }
                None => false,
            },
            Err(e) => {
                tracing::error!("job registry lock poisoned on transition: {e}");
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        match self.jobs.read() {
            Ok(jobs) => jobs.len(),
            Err(e) => {
                tracing::error!("job registry lock poisoned on len: {e}");
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_progress(id: &str) -> Job {
        Job {
            id: id.to_string(),
            file_name: format!("logpack-{id}"),
            state: JobState::InProgress,
            error: None,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let registry = JobRegistry::new();
        registry.insert(in_progress("1"));

        let job = registry.get("1").expect("job present");
        assert_eq!(job.id, "1");
        assert_eq!(job.state, JobState::InProgress);
        assert!(registry.get("2").is_none());
    }

    #[test]
    fn test_insert_overwrites() {
        let registry = JobRegistry::new();
        registry.insert(in_progress("1"));
        let mut replacement = in_progress("1");
        replacement.file_name = "logpack-other".to_string();
        registry.insert(replacement);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("1").unwrap().file_name, "logpack-other");
    }

    #[test]
    fn test_remove_returns_prior_value() {
        let registry = JobRegistry::new();
        registry.insert(in_progress("1"));

        let removed = registry.remove("1").expect("job present");
        assert_eq!(removed.id, "1");
        assert!(registry.get("1").is_none());
        assert!(registry.remove("1").is_none());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let registry = JobRegistry::new();
        registry.insert(in_progress("1"));
        registry.insert(in_progress("2"));

        let mut snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);

        // Mutating the snapshot must not leak back into the registry.
        snapshot[0].state = JobState::Failed;
        assert!(registry
            .snapshot()
            .iter()
            .all(|j| j.state == JobState::InProgress));
    }

    #[test]
    fn test_complete_transitions_in_progress() {
        let registry = JobRegistry::new();
        registry.insert(in_progress("1"));

        assert!(registry.complete("1"));
        assert_eq!(registry.get("1").unwrap().state, JobState::Done);
    }

    #[test]
    fn test_complete_on_missing_id_is_noop() {
        let registry = JobRegistry::new();
        assert!(!registry.complete("ghost"));
        assert!(!registry.fail("ghost", "boom"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_fail_records_error() {
        let registry = JobRegistry::new();
        registry.insert(in_progress("1"));

        assert!(registry.fail("1", "collector exited with status 1"));
        let job = registry.get("1").unwrap();
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(
            job.error.as_deref(),
            Some("collector exited with status 1")
        );
    }

    #[test]
    fn test_terminal_states_never_transition() {
        let registry = JobRegistry::new();
        registry.insert(in_progress("1"));

        assert!(registry.complete("1"));
        assert!(registry.fail("1", "late failure"));
        let job = registry.get("1").unwrap();
        assert_eq!(job.state, JobState::Done);
        assert!(job.error.is_none());

        registry.insert(in_progress("2"));
        assert!(registry.fail("2", "boom"));
        assert!(registry.complete("2"));
        assert_eq!(registry.get("2").unwrap().state, JobState::Failed);
    }

    #[test]
    fn test_concurrent_inserts_lose_nothing() {
        let registry = JobRegistry::new();
        std::thread::scope(|scope| {
            for t in 0..8 {
                let registry = &registry;
                scope.spawn(move || {
                    for i in 0..100 {
                        registry.insert(in_progress(&format!("{t}-{i}")));
                    }
                });
            }
        });
        assert_eq!(registry.len(), 800);
    }

    #[test]
    fn test_concurrent_mixed_operations() {
        let registry = JobRegistry::new();
        for i in 0..100 {
            registry.insert(in_progress(&format!("keep-{i}")));
            registry.insert(in_progress(&format!("drop-{i}")));
        }

        std::thread::scope(|scope| {
            let r = &registry;
            scope.spawn(move || {
                for i in 0..100 {
                    r.remove(&format!("drop-{i}"));
                }
            });
            scope.spawn(move || {
                for i in 0..100 {
                    r.complete(&format!("keep-{i}"));
                }
            });
            scope.spawn(move || {
                for _ in 0..100 {
                    let _ = r.snapshot();
                }
            });
        });

        assert_eq!(registry.len(), 100);
        for i in 0..100 {
            assert_eq!(
                registry.get(&format!("keep-{i}")).unwrap().state,
                JobState::Done
            );
            assert!(registry.get(&format!("drop-{i}")).is_none());
        }
    }
}
