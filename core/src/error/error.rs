use thiserror::Error;

use super::executor::ExecutorError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("work area error: {0}")]
    WorkArea(String),
    #[error("benchmark failed: {0}")]
    Executor(#[from] ExecutorError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Task-level failure of a single workflow step.
///
/// These never abort the run: the executor turns them into the final failed
/// entry of the task's log.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("{0}")]
    Library(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend worker failed: {0}")]
    Worker(String),
}
