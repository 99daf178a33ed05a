// crates/server/src/collector.rs
//! Collector runner: one fire-and-forget task per created job.
//!
//! The external collector executable is invoked with three positional
//! arguments — artifact directory, artifact base name, history length — and
//! is expected to produce `<dir>/<name>.zip` and exit 0. Its stdout/stderr
//! are inherited so collection output lands in the service's own log stream.

use std::process::ExitStatus;
use std::sync::Arc;

use thiserror::Error;
use tokio::process::Command;

use logpack_core::{archive_file_name, Job};

use crate::state::AppState;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to launch collector {command:?}: {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },

    #[error("collector exited with {0}")]
    Exit(ExitStatus),
}

/// Spawn the collection task for a freshly created job.
///
/// Called exactly once per job, after the record is registered and before
/// the creating handler returns. The caller holds no handle: the task's only
/// communication path back is the registry update, and there is no
/// cancellation — deleting the job lets the process run to completion and
/// turns its final registry update into a no-op.
pub fn spawn_collection(state: Arc<AppState>, job: &Job) {
    let id = job.id.clone();
    let file_name = job.file_name.clone();

    tokio::spawn(async move {
        tracing::debug!(job_id = %id, file = %file_name, "start: collecting logs");
        match run_collector(&state, &file_name).await {
            Ok(()) => {
                if state.registry.complete(&id) {
                    tracing::info!(job_id = %id, file = %file_name, "log collection complete");
                } else {
                    tracing::debug!(job_id = %id, "job deleted while collection was running");
                }
            }
            Err(e) => {
                tracing::error!(job_id = %id, error = %e, "log collection failed");
                if !state.registry.fail(&id, e.to_string()) {
                    tracing::debug!(job_id = %id, "job deleted before collection failed");
                }
            }
        }
    });
}

async fn run_collector(state: &AppState, file_name: &str) -> Result<(), CollectError> {
    let status = Command::new(&state.config.collector)
        .arg(&state.config.logs_dir)
        .arg(file_name)
        .arg(state.config.history_length.to_string())
        .status()
        .await
        .map_err(|source| CollectError::Launch {
            command: state.config.collector.clone(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CollectError::Exit(status))
    }
}

/// Best-effort removal of a deleted job's backing archive.
///
/// Decoupled from the registry mutation: the entry is already gone, and a
/// removal failure is logged, nothing more.
pub fn spawn_artifact_removal(state: &Arc<AppState>, file_name: &str) {
    let path = state.config.logs_dir.join(archive_file_name(file_name));
    tokio::spawn(async move {
        tracing::debug!(path = %path.display(), "deleting artifact file");
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::error!(path = %path.display(), error = %e, "error deleting artifact file");
        }
    });
}
