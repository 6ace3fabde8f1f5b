//! Backend abstraction for the git operations a benchmark task performs.
//!
//! A backend is selected once when the harness is configured and shared by
//! every task of the run. Implementations live in `gitbench-plugins`.

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::WorkflowConfig;
use crate::error::BackendError;

pub type BackendResult = Result<(), BackendError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Spawn the git executable once per step.
    #[default]
    Process,
    /// Run every step in-process through libgit2.
    Library,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Process => "process",
            BackendKind::Library => "library",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "process" | "git" | "cli" => Ok(BackendKind::Process),
            "library" | "lib" | "git2" | "embedded" => Ok(BackendKind::Library),
            other => Err(format!("unknown backend kind: {other}")),
        }
    }
}

/// Message and synthetic identity used for every benchmark commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSpec {
    pub message: String,
    pub author_name: String,
    pub author_email: String,
}

impl From<&WorkflowConfig> for CommitSpec {
    fn from(cfg: &WorkflowConfig) -> Self {
        Self {
            message: cfg.commit_message.clone(),
            author_name: cfg.author_name.clone(),
            author_email: cfg.author_email.clone(),
        }
    }
}

/// The git capability set a workflow runs against.
///
/// Every method operates on the task's own working directory. Failures are
/// task-level: they end the calling task's workflow and nothing else.
#[async_trait]
pub trait GitBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch `repo_url` into the (existing, empty) `work_dir`.
    async fn acquire(&self, repo_url: &str, work_dir: &Path) -> BackendResult;

    /// Create `branch` from the current HEAD and switch to it.
    async fn branch(&self, work_dir: &Path, branch: &str) -> BackendResult;

    /// Stage every change in the working tree.
    async fn stage(&self, work_dir: &Path) -> BackendResult;

    async fn commit(&self, work_dir: &Path, commit: &CommitSpec) -> BackendResult;

    /// Push `branch` to `remote`.
    async fn publish(&self, work_dir: &Path, remote: &str, branch: &str) -> BackendResult;
}

/// Await `fut` and measure the wall-clock time it took, whatever its outcome.
pub async fn timed<F>(fut: F) -> (F::Output, Duration)
where
    F: Future,
{
    let start = Instant::now();
    let out = fut.await;
    (out, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("process".parse::<BackendKind>(), Ok(BackendKind::Process));
        assert_eq!(" Library ".parse::<BackendKind>(), Ok(BackendKind::Library));
        assert_eq!("git2".parse::<BackendKind>(), Ok(BackendKind::Library));
        assert!("svn".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_commit_spec_from_workflow_defaults() {
        let spec = CommitSpec::from(&WorkflowConfig::default());
        assert_eq!(spec.message, "Test commit");
        assert_eq!(spec.author_name, "git-bench");
        assert_eq!(spec.author_email, "git-bench@example.com");
    }

    #[tokio::test]
    async fn test_timed_measures_failed_calls_too() {
        let (out, elapsed) = timed(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Err::<(), _>("boom")
        })
        .await;
        assert_eq!(out, Err("boom"));
        assert!(elapsed >= Duration::from_millis(5));
    }
}
