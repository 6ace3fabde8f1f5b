use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use gitbench_core::backend::{BackendResult, CommitSpec, GitBackend};
use gitbench_core::error::BackendError;

/// Runs every step by spawning the git executable. All steps after the
/// clone run inside the task directory.
pub struct ProcessBackend {
    git_bin: String,
}

impl ProcessBackend {
    pub fn new(git_bin: impl Into<String>) -> Self {
        Self {
            git_bin: git_bin.into(),
        }
    }

    async fn run_git(&self, dir: &Path, args: &[&str]) -> BackendResult {
        self.run_git_with(Some(dir), args, &[]).await
    }

    /// Run git with `args`. Without `dir` the command runs in the process
    /// working directory.
    async fn run_git_with(
        &self,
        dir: Option<&Path>,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> BackendResult {
        let command = format!("{} {}", self.git_bin, args.join(" "));

        let mut cmd = Command::new(&self.git_bin);
        cmd.args(args)
            // Never block on a credential prompt.
            .env("GIT_TERMINAL_PROMPT", "0")
            .envs(envs.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if let Some(dir) = dir {
            tracing::debug!("running `{}` in {}", command, dir.display());
            cmd.current_dir(dir);
        } else {
            tracing::debug!("running `{}`", command);
        }

        let output = cmd.output().await.map_err(|source| BackendError::Spawn {
            program: self.git_bin.clone(),
            source,
        })?;

        if output.status.success() {
            return Ok(());
        }

        Err(BackendError::CommandFailed {
            command,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Default for ProcessBackend {
    fn default() -> Self {
        Self::new("git")
    }
}

#[async_trait]
impl GitBackend for ProcessBackend {
    fn name(&self) -> &str {
        "process"
    }

    async fn acquire(&self, repo_url: &str, work_dir: &Path) -> BackendResult {
        // Relative URLs resolve against the caller's directory, as with libgit2.
        let target = work_dir.to_string_lossy();
        self.run_git_with(None, &["clone", repo_url, &target], &[]).await
    }

    async fn branch(&self, work_dir: &Path, branch: &str) -> BackendResult {
        self.run_git(work_dir, &["checkout", "-b", branch]).await
    }

    async fn stage(&self, work_dir: &Path) -> BackendResult {
        self.run_git(work_dir, &["add", "."]).await
    }

    async fn commit(&self, work_dir: &Path, commit: &CommitSpec) -> BackendResult {
        let name = format!("user.name={}", commit.author_name);
        let email = format!("user.email={}", commit.author_email);
        // GIT_AUTHOR_* / GIT_COMMITTER_* in the environment beat `-c` config.
        let identity = [
            ("GIT_AUTHOR_NAME", commit.author_name.as_str()),
            ("GIT_AUTHOR_EMAIL", commit.author_email.as_str()),
            ("GIT_COMMITTER_NAME", commit.author_name.as_str()),
            ("GIT_COMMITTER_EMAIL", commit.author_email.as_str()),
        ];
        self.run_git_with(
            Some(work_dir),
            &["-c", &name, "-c", &email, "commit", "-m", &commit.message],
            &identity,
        )
        .await
    }

    async fn publish(&self, work_dir: &Path, remote: &str, branch: &str) -> BackendResult {
        self.run_git(work_dir, &["push", "-u", remote, branch]).await
    }
}
