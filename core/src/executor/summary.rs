use std::time::Duration;

use serde::Serialize;

use crate::util::serde_utils::duration_ms;

use super::types::{BenchmarkRun, StepName};

/// Latency figures for one workflow step across all tasks of a run.
///
/// Timing statistics only cover successful executions; failures are counted
/// separately since a failed step's duration says little about the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepStats {
    pub step: StepName,
    pub runs: usize,
    pub failures: usize,
    #[serde(rename = "min_ms", with = "duration_ms")]
    pub min: Duration,
    #[serde(rename = "mean_ms", with = "duration_ms")]
    pub mean: Duration,
    #[serde(rename = "max_ms", with = "duration_ms")]
    pub max: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub steps: Vec<StepStats>,
}

pub fn summarize(run: &BenchmarkRun) -> RunSummary {
    let steps = std::iter::once(StepName::Setup)
        .chain(StepName::WORKFLOW)
        .filter_map(|step| step_stats(run, step))
        .collect();

    RunSummary {
        completed_tasks: run.completed(),
        failed_tasks: run.failed(),
        steps,
    }
}

fn step_stats(run: &BenchmarkRun, step: StepName) -> Option<StepStats> {
    let attempts: Vec<_> = run
        .results
        .iter()
        .flat_map(|log| log.steps.iter())
        .filter(|r| r.step == step)
        .collect();
    if attempts.is_empty() {
        return None;
    }

    let ok: Vec<Duration> = attempts
        .iter()
        .filter(|r| r.success)
        .map(|r| r.duration)
        .collect();
    let failures = attempts.len() - ok.len();

    let (min, mean, max) = if ok.is_empty() {
        (Duration::ZERO, Duration::ZERO, Duration::ZERO)
    } else {
        let total: Duration = ok.iter().sum();
        (
            ok.iter().copied().min().unwrap_or_default(),
            total / ok.len() as u32,
            ok.iter().copied().max().unwrap_or_default(),
        )
    };

    Some(StepStats {
        step,
        runs: attempts.len(),
        failures,
        min,
        mean,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::types::{StepResult, WorkflowLog};
    use pretty_assertions::assert_eq;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn log(index: usize, acquire_ms: u64, fail_branch: bool) -> WorkflowLog {
        let mut log = WorkflowLog::new(index);
        log.push(StepResult::success(StepName::Acquire, ms(acquire_ms), "ok"));
        if fail_branch {
            log.push(StepResult::failure(StepName::Branch, ms(1), "nope"));
        } else {
            log.push(StepResult::success(StepName::Branch, ms(2), "ok"));
        }
        log
    }

    #[test]
    fn test_summary_covers_attempted_steps_only() {
        let run = BenchmarkRun {
            task_count: 3,
            concurrency_limit: 2,
            backend: "stub".to_string(),
            results: vec![log(0, 10, false), log(1, 30, true), log(2, 20, false)],
            total_elapsed: ms(100),
        };

        let summary = summarize(&run);

        assert_eq!(summary.completed_tasks, 0);
        assert_eq!(summary.failed_tasks, 3);
        assert_eq!(
            summary.steps,
            vec![
                StepStats {
                    step: StepName::Acquire,
                    runs: 3,
                    failures: 0,
                    min: ms(10),
                    mean: ms(20),
                    max: ms(30),
                },
                StepStats {
                    step: StepName::Branch,
                    runs: 3,
                    failures: 1,
                    min: ms(2),
                    mean: ms(2),
                    max: ms(2),
                },
            ]
        );
    }

    #[test]
    fn test_all_failed_step_has_zero_timings() {
        let run = BenchmarkRun {
            task_count: 1,
            concurrency_limit: 1,
            backend: "stub".to_string(),
            results: vec![WorkflowLog::aborted(0, "mkdir failed")],
            total_elapsed: ms(1),
        };

        let summary = summarize(&run);
        assert_eq!(summary.steps.len(), 1);
        assert_eq!(summary.steps[0].step, StepName::Setup);
        assert_eq!(summary.steps[0].failures, 1);
        assert_eq!(summary.steps[0].mean, Duration::ZERO);
    }
}
