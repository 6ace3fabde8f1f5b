use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::{timed, CommitSpec, GitBackend};
use crate::config::WorkflowConfig;
use crate::error::{BackendError, ExecutorError};
use crate::util::IdSource;

use super::types::{StepName, StepResult, Task, WorkflowLog};

/// Names generated for one task before its workflow starts.
#[derive(Debug, Clone)]
struct TaskNames {
    branch: String,
    file: PathBuf,
}

/// Drives a single task through the fixed workflow against one backend.
///
/// Steps run strictly in order and every attempted step is timed and logged,
/// including the one that fails. The first failure ends the workflow.
pub struct WorkflowExecutor {
    backend: Arc<dyn GitBackend>,
    ids: Arc<dyn IdSource>,
    workflow: WorkflowConfig,
    commit: CommitSpec,
}

impl WorkflowExecutor {
    pub fn new(
        backend: Arc<dyn GitBackend>,
        ids: Arc<dyn IdSource>,
        workflow: WorkflowConfig,
    ) -> Self {
        let commit = CommitSpec::from(&workflow);
        Self {
            backend,
            ids,
            workflow,
            commit,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn execute(&self, task: &Task) -> Result<WorkflowLog, ExecutorError> {
        self.execute_observed(task, |_| {}).await
    }

    /// Like [`execute`](Self::execute), calling `on_step` before each step starts.
    ///
    /// Only a failure of the random source is returned as an error; every
    /// other failure ends up in the returned log.
    pub async fn execute_observed<F>(
        &self,
        task: &Task,
        on_step: F,
    ) -> Result<WorkflowLog, ExecutorError>
    where
        F: Fn(StepName),
    {
        let names = self.generate_names(&task.work_dir)?;
        let mut log = WorkflowLog::new(task.index);

        let (setup, elapsed) = timed(self.run_step(StepName::Setup, task, &names)).await;
        if let Err(e) = setup {
            tracing::warn!("task {} setup failed: {}", task.index, e);
            log.push(StepResult::failure(StepName::Setup, elapsed, e.to_string()));
            return Ok(log);
        }

        for step in StepName::WORKFLOW {
            on_step(step);
            let (outcome, duration) = timed(self.run_step(step, task, &names)).await;
            let result = match outcome {
                Ok(message) => StepResult::success(step, duration, message),
                Err(e) => StepResult::failure(step, duration, e.to_string()),
            };
            tracing::debug!(
                task = task.index,
                step = %step,
                success = result.success,
                "step finished in {:?}",
                duration
            );

            let failed = !result.success;
            log.push(result);
            if failed {
                tracing::warn!(
                    "task {} stopped at {}: {}",
                    task.index,
                    step,
                    log.steps.last().map(|r| r.message.as_str()).unwrap_or_default()
                );
                break;
            }
        }

        Ok(log)
    }

    fn generate_names(&self, work_dir: &Path) -> Result<TaskNames, ExecutorError> {
        let branch = self.ids.next_id()?;
        let file = work_dir.join(format!(
            "{}.{}",
            self.ids.next_id()?,
            self.workflow.file_extension
        ));
        Ok(TaskNames { branch, file })
    }

    async fn run_step(
        &self,
        step: StepName,
        task: &Task,
        names: &TaskNames,
    ) -> Result<String, BackendError> {
        let dir = task.work_dir.as_path();
        match step {
            StepName::Setup => {
                tokio::fs::create_dir_all(dir).await.map_err(|e| {
                    BackendError::Io(std::io::Error::new(
                        e.kind(),
                        format!("failed to create directory {}: {}", dir.display(), e),
                    ))
                })?;
                Ok(format!("created {}", dir.display()))
            }
            StepName::Acquire => {
                self.backend.acquire(&task.repo_url, dir).await?;
                Ok(format!("cloned {} into {}", task.repo_url, dir.display()))
            }
            StepName::Branch => {
                self.backend.branch(dir, &names.branch).await?;
                Ok(format!("checked out new branch {}", names.branch))
            }
            StepName::WriteFile => {
                tokio::fs::write(&names.file, self.workflow.file_content.as_bytes()).await?;
                Ok(format!("created file {}", names.file.display()))
            }
            StepName::Stage => {
                self.backend.stage(dir).await?;
                Ok(format!("staged {}", names.file.display()))
            }
            StepName::Commit => {
                self.backend.commit(dir, &self.commit).await?;
                Ok(format!("committed \"{}\"", self.commit.message))
            }
            StepName::Publish => {
                self.backend
                    .publish(dir, &self.workflow.remote, &names.branch)
                    .await?;
                Ok(format!(
                    "pushed branch {} to {}",
                    names.branch, self.workflow.remote
                ))
            }
        }
    }
}
