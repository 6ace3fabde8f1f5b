use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::serde_utils::duration_ms;

/// A timed step of a task.
///
/// `Setup` only ever appears as the single failed entry of a task whose
/// working directory could not be prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    Setup,
    Acquire,
    Branch,
    WriteFile,
    Stage,
    Commit,
    Publish,
}

impl StepName {
    /// The fixed workflow, in execution order.
    pub const WORKFLOW: [StepName; 6] = [
        StepName::Acquire,
        StepName::Branch,
        StepName::WriteFile,
        StepName::Stage,
        StepName::Commit,
        StepName::Publish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::Setup => "setup",
            StepName::Acquire => "acquire",
            StepName::Branch => "branch",
            StepName::WriteFile => "write_file",
            StepName::Stage => "stage",
            StepName::Commit => "commit",
            StepName::Publish => "publish",
        }
    }

    /// Human readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            StepName::Setup => "directory setup",
            StepName::Acquire => "clone",
            StepName::Branch => "checkout",
            StepName::WriteFile => "write file",
            StepName::Stage => "stage",
            StepName::Commit => "commit",
            StepName::Publish => "push",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one step. Never mutated after it is appended to a log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step: StepName,
    #[serde(rename = "duration_ms", with = "duration_ms")]
    pub duration: Duration,
    pub success: bool,
    pub message: String,
}

impl StepResult {
    pub fn success(step: StepName, duration: Duration, message: impl Into<String>) -> Self {
        Self {
            step,
            duration,
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(step: StepName, duration: Duration, message: impl Into<String>) -> Self {
        Self {
            step,
            duration,
            success: false,
            message: message.into(),
        }
    }
}

/// Ordered, append-only record of one task's steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowLog {
    pub index: usize,
    pub steps: Vec<StepResult>,
}

impl WorkflowLog {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            steps: Vec::with_capacity(StepName::WORKFLOW.len()),
        }
    }

    /// Log for a task that never got to run its workflow.
    pub fn aborted(index: usize, message: impl Into<String>) -> Self {
        let mut log = Self::new(index);
        log.push(StepResult::failure(StepName::Setup, Duration::ZERO, message));
        log
    }

    pub fn push(&mut self, result: StepResult) {
        self.steps.push(result);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True when all six workflow steps ran and succeeded.
    pub fn is_complete(&self) -> bool {
        self.steps.len() == StepName::WORKFLOW.len()
            && self
                .steps
                .iter()
                .zip(StepName::WORKFLOW)
                .all(|(r, step)| r.success && r.step == step)
    }

    pub fn failed_step(&self) -> Option<&StepResult> {
        self.steps.iter().find(|r| !r.success)
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|r| r.duration).sum()
    }
}

/// Everything a finished benchmark run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRun {
    pub task_count: usize,
    pub concurrency_limit: usize,
    pub backend: String,
    /// One log per task, ordered by task index.
    pub results: Vec<WorkflowLog>,
    #[serde(rename = "total_elapsed_ms", with = "duration_ms")]
    pub total_elapsed: Duration,
}

impl BenchmarkRun {
    pub fn completed(&self) -> usize {
        self.results.iter().filter(|l| l.is_complete()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.completed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_log(index: usize) -> WorkflowLog {
        let mut log = WorkflowLog::new(index);
        for step in StepName::WORKFLOW {
            log.push(StepResult::success(step, Duration::from_millis(2), "ok"));
        }
        log
    }

    #[test]
    fn test_complete_log() {
        let log = full_log(0);
        assert!(log.is_complete());
        assert!(log.failed_step().is_none());
        assert_eq!(log.total_duration(), Duration::from_millis(12));
    }

    #[test]
    fn test_truncated_log_is_not_complete() {
        let mut log = WorkflowLog::new(1);
        log.push(StepResult::success(StepName::Acquire, Duration::ZERO, "ok"));
        log.push(StepResult::failure(StepName::Branch, Duration::ZERO, "bad ref"));

        assert!(!log.is_complete());
        assert_eq!(log.failed_step().map(|r| r.step), Some(StepName::Branch));
    }

    #[test]
    fn test_aborted_log_has_single_setup_failure() {
        let log = WorkflowLog::aborted(3, "permission denied");
        assert_eq!(log.len(), 1);
        assert_eq!(log.steps[0].step, StepName::Setup);
        assert!(!log.steps[0].success);
    }

    #[test]
    fn test_run_counts() {
        let run = BenchmarkRun {
            task_count: 2,
            concurrency_limit: 1,
            backend: "process".to_string(),
            results: vec![full_log(0), WorkflowLog::aborted(1, "x")],
            total_elapsed: Duration::from_secs(1),
        };
        assert_eq!(run.completed(), 1);
        assert_eq!(run.failed(), 1);
    }

    #[test]
    fn test_step_result_json_shape() {
        let json = serde_json::to_value(StepResult::failure(
            StepName::WriteFile,
            Duration::from_millis(3),
            "disk full",
        ))
        .unwrap();
        assert_eq!(json["step"], "write_file");
        assert_eq!(json["duration_ms"], 3.0);
        assert_eq!(json["success"], false);
    }
}
