//! Concurrent benchmark harness
//!
//! Runs the fixed git workflow for many tasks with bounded concurrency and
//! collects one timing log per task.
//!
//! # Architecture
//!
//! ```text
//! BenchPlan
//!   ↓
//! TaskScheduler::run() → Semaphore(concurrency_limit)
//!   ↓                      ↓ one tokio task per Task
//! WorkflowExecutor::execute() → GitBackend calls, timed per step
//!   ↓
//! ResultCollector (write-once slot per task index)
//!   ↓
//! BenchmarkRun → emit_report()
//! ```

mod collector;
mod engine;
mod output;
mod progress;
mod scheduler;
mod summary;
pub mod types;

pub use collector::ResultCollector;
pub use engine::WorkflowExecutor;
pub use output::{emit_report, render_text, report_events, BenchEvent};
pub use progress::ProgressMonitor;
pub use scheduler::{BenchPlan, TaskScheduler};
pub use summary::{summarize, RunSummary, StepStats};
pub use types::{
    BenchmarkRun, ReportFormat, ReportOpts, StepName, StepResult, Task, WorkflowLog,
};
