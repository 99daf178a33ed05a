// crates/core/src/reconcile.rs
//! Startup reconciliation: rebuild registry entries from artifacts on disk.
//!
//! The registry is memory-resident, so a restart would otherwise lose
//! visibility into archives produced before it. Artifact file names embed the
//! job id (`logpack-<id>.zip`), which is enough to reconstruct a completed
//! job record per file.

use std::path::Path;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::job::{Job, ARCHIVE_EXTENSION, ARTIFACT_PREFIX};

/// Compiled artifact-name pattern, built once per process.
static ARTIFACT_RE: OnceLock<Regex> = OnceLock::new();

fn artifact_re() -> &'static Regex {
    ARTIFACT_RE.get_or_init(|| {
        Regex::new(&format!(r"^({ARTIFACT_PREFIX}-(.+))\.{ARCHIVE_EXTENSION}$"))
            .expect("valid artifact pattern")
    })
}

/// Job identity recovered from an artifact file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArtifact {
    pub id: String,
    pub file_name: String,
}

/// Parse `logpack-<id>.zip` into its job id and base name.
///
/// Anything that does not match the naming convention yields `None`.
pub fn parse_artifact_file_name(name: &str) -> Option<ParsedArtifact> {
    let captures = artifact_re().captures(name)?;
    Some(ParsedArtifact {
        id: captures.get(2)?.as_str().to_string(),
        file_name: captures.get(1)?.as_str().to_string(),
    })
}

/// Scan the artifact directory and rebuild one `Done` record per archive.
///
/// Non-matching files are ignored. A directory-read failure is logged and
/// yields an empty set — untracked archives stay downloadable by direct
/// path, they just don't resurface in the listing.
pub fn scan_artifact_dir(dir: &Path) -> Vec<Job> {
    tracing::debug!(dir = %dir.display(), "scanning for existing artifacts");

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(dir = %dir.display(), error = %e, "error reading artifact directory");
            return Vec::new();
        }
    };

    let mut jobs = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(parsed) = parse_artifact_file_name(name) else {
            continue;
        };
        tracing::debug!(file = %name, job_id = %parsed.id, "found existing artifact");
        jobs.push(Job::from_existing_artifact(parsed.id, parsed.file_name));
    }
    jobs
}
