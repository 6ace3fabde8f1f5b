#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gitbench_core::backend::{BackendResult, CommitSpec, GitBackend};
use gitbench_core::config::WorkflowConfig;
use gitbench_core::error::BackendError;
use gitbench_core::executor::{BenchPlan, StepName, TaskScheduler, WorkflowExecutor};
use gitbench_core::util::IdSource;

/// Stub backend that succeeds unless told otherwise and records how many
/// calls were in flight at once.
#[derive(Default)]
pub struct InstrumentedBackend {
    pub delay: Duration,
    pub fail: Option<(usize, StepName)>,
    pub panic_on: Option<usize>,
    active: AtomicUsize,
    high_water: AtomicUsize,
    calls: AtomicUsize,
    branches: Mutex<Vec<String>>,
}

impl InstrumentedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, index: usize, step: StepName) -> Self {
        self.fail = Some((index, step));
        self
    }

    pub fn panicking(mut self, index: usize) -> Self {
        self.panic_on = Some(index);
        self
    }

    pub fn high_water(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn branches(&self) -> Vec<String> {
        self.branches.lock().unwrap().clone()
    }

    async fn call(&self, work_dir: &Path, step: StepName) -> BackendResult {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        let index = task_index(work_dir);
        if self.panic_on == Some(index) {
            panic!("backend blew up for task {index}");
        }
        match self.fail {
            Some((i, s)) if i == index && s == step => Err(BackendError::CommandFailed {
                command: format!("git {step}"),
                status: "exit status: 128".to_string(),
                stderr: format!("fatal: stub failure for repo_{index}"),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl GitBackend for InstrumentedBackend {
    fn name(&self) -> &str {
        "instrumented"
    }

    async fn acquire(&self, _repo_url: &str, work_dir: &Path) -> BackendResult {
        self.call(work_dir, StepName::Acquire).await
    }

    async fn branch(&self, work_dir: &Path, branch: &str) -> BackendResult {
        self.branches.lock().unwrap().push(branch.to_string());
        self.call(work_dir, StepName::Branch).await
    }

    async fn stage(&self, work_dir: &Path) -> BackendResult {
        self.call(work_dir, StepName::Stage).await
    }

    async fn commit(&self, work_dir: &Path, _commit: &CommitSpec) -> BackendResult {
        self.call(work_dir, StepName::Commit).await
    }

    async fn publish(&self, work_dir: &Path, _remote: &str, _branch: &str) -> BackendResult {
        self.call(work_dir, StepName::Publish).await
    }
}

/// Task index from a `repo_<index>` working directory.
pub fn task_index(work_dir: &Path) -> usize {
    work_dir
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_prefix("repo_"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(usize::MAX)
}

pub fn plan(base_dir: &Path, task_count: usize, concurrency_limit: usize) -> BenchPlan {
    BenchPlan {
        repo_url: "git@example.com:bench/target.git".to_string(),
        base_dir: base_dir.to_path_buf(),
        task_count,
        concurrency_limit,
    }
}

pub fn scheduler(backend: Arc<InstrumentedBackend>, ids: Arc<dyn IdSource>) -> TaskScheduler {
    TaskScheduler::new(WorkflowExecutor::new(
        backend,
        ids,
        WorkflowConfig::default(),
    ))
}
