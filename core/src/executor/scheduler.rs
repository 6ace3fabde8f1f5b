use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::Semaphore;
use tokio::task::{AbortHandle, JoinHandle};

use crate::error::ExecutorError;

use super::collector::ResultCollector;
use super::engine::WorkflowExecutor;
use super::progress::ProgressMonitor;
use super::types::{BenchmarkRun, Task, WorkflowLog};

/// What to run: `task_count` workflows against `repo_url`, at most
/// `concurrency_limit` at a time, each under `base_dir`.
#[derive(Debug, Clone)]
pub struct BenchPlan {
    pub repo_url: String,
    pub base_dir: PathBuf,
    pub task_count: usize,
    pub concurrency_limit: usize,
}

impl BenchPlan {
    pub fn validate(&self) -> Result<(), ExecutorError> {
        if self.concurrency_limit < 1 {
            return Err(ExecutorError::InvalidConcurrency(self.concurrency_limit));
        }
        if self.task_count < 1 {
            return Err(ExecutorError::InvalidTaskCount(self.task_count));
        }
        Ok(())
    }

    pub fn tasks(&self) -> Vec<Task> {
        (0..self.task_count)
            .map(|i| Task::new(i, self.repo_url.clone(), &self.base_dir))
            .collect()
    }
}

/// Runs every task of a plan with bounded concurrency.
pub struct TaskScheduler {
    executor: Arc<WorkflowExecutor>,
    progress_bar: bool,
}

impl TaskScheduler {
    pub fn new(executor: WorkflowExecutor) -> Self {
        Self {
            executor: Arc::new(executor),
            progress_bar: false,
        }
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress_bar = enabled;
        self
    }

    /// Execute all tasks of `plan` and wait for every one of them.
    ///
    /// A task holds one semaphore permit from directory creation until its
    /// workflow ends; the permit is released on every exit path, panics
    /// included. Task failures are recorded in the run, never returned.
    pub async fn run(&self, plan: &BenchPlan) -> Result<BenchmarkRun, ExecutorError> {
        plan.validate()?;

        let start = Instant::now();
        let sem = Arc::new(Semaphore::new(plan.concurrency_limit));
        let collector = Arc::new(ResultCollector::new(plan.task_count));
        let progress = Arc::new(Mutex::new(ProgressMonitor::new(
            plan.task_count,
            self.progress_bar,
        )));

        tracing::info!(
            "Starting git bench with concurrency={}, count={}, backend={}",
            plan.concurrency_limit,
            plan.task_count,
            self.executor.backend_name()
        );

        let mut aborts: Vec<AbortHandle> = Vec::with_capacity(plan.task_count);
        let mut workers = FuturesUnordered::new();

        for task in plan.tasks() {
            let index = task.index;
            let sem = sem.clone();
            let executor = self.executor.clone();
            let collector = collector.clone();
            let progress = progress.clone();

            let handle: JoinHandle<Result<(), ExecutorError>> = tokio::spawn(async move {
                let _permit = sem
                    .acquire_owned()
                    .await
                    .map_err(|_| ExecutorError::Runner("semaphore closed unexpectedly".into()))?;

                if let Ok(mut monitor) = progress.lock() {
                    monitor.add_task(task.index);
                }

                let task_start = Instant::now();
                let log = executor
                    .execute_observed(&task, |step| {
                        if let Ok(monitor) = progress.lock() {
                            monitor.set_step(task.index, step);
                        }
                    })
                    .await?;

                let success = log.is_complete();
                if let Ok(mut monitor) = progress.lock() {
                    monitor.complete_task(task.index, success, task_start.elapsed());
                }
                tracing::info!(
                    "task {} finished in {:?} ({} steps, success={})",
                    task.index,
                    task_start.elapsed(),
                    log.len(),
                    success
                );

                collector.record(task.index, log)?;
                Ok(())
            });
            aborts.push(handle.abort_handle());
            workers.push(async move { (index, handle.await) });
        }

        // Drain in completion order so a fatal error stops the run as soon as it happens.
        while let Some((index, outcome)) = workers.next().await {
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    for abort in &aborts {
                        abort.abort();
                    }
                    if let Ok(monitor) = progress.lock() {
                        monitor.clear();
                    }
                    tracing::error!("benchmark aborted by task {}: {}", index, e);
                    return Err(e);
                }
                Err(join_err) => {
                    tracing::error!("task {} worker died: {}", index, join_err);
                    record_worker_failure(&collector, &progress, index, &join_err.to_string())?;
                }
            }
        }
        drop(workers);

        let collector = Arc::try_unwrap(collector)
            .map_err(|_| ExecutorError::Runner("result collector still shared".into()))?;
        let results = collector.into_logs()?;

        let run = BenchmarkRun {
            task_count: plan.task_count,
            concurrency_limit: plan.concurrency_limit,
            backend: self.executor.backend_name().to_string(),
            results,
            total_elapsed: start.elapsed(),
        };

        if let Ok(monitor) = progress.lock() {
            monitor.finish(run.failed());
        }
        tracing::info!(
            "Completed git bench in {:?} ({} completed, {} failed)",
            run.total_elapsed,
            run.completed(),
            run.failed()
        );

        Ok(run)
    }
}

/// Give a task whose worker died its single failed log and close its
/// progress line.
fn record_worker_failure(
    collector: &ResultCollector,
    progress: &Mutex<ProgressMonitor>,
    index: usize,
    reason: &str,
) -> Result<(), ExecutorError> {
    if let Ok(mut monitor) = progress.lock() {
        monitor.complete_task(index, false, Duration::ZERO);
    }
    if !collector.is_recorded(index) {
        collector.record(
            index,
            WorkflowLog::aborted(index, format!("task worker failed: {reason}")),
        )?;
    }
    Ok(())
}
