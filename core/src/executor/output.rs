use std::fmt::Write as _;

use chrono::Local;
use serde::Serialize;

use super::summary::{summarize, RunSummary};
use super::types::{task_dir_name, BenchmarkRun, ReportFormat, ReportOpts, StepResult};

/// One line of the JSON Lines report.
#[derive(Debug, Clone, Serialize)]
pub struct BenchEvent {
    pub v: i32,
    #[serde(rename = "type")]
    pub event_type: String,
    pub ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl BenchEvent {
    fn new(event_type: &str, task_index: Option<usize>, metadata: serde_json::Value) -> Self {
        Self {
            v: 1,
            event_type: event_type.to_string(),
            ts: Local::now().to_rfc3339(),
            task_index,
            metadata: Some(metadata),
        }
    }
}

/// Print the finished run to stdout in the requested format.
pub fn emit_report(run: &BenchmarkRun, opts: &ReportOpts) {
    match opts.format {
        ReportFormat::Jsonl => {
            for event in report_events(run) {
                if let Ok(line) = serde_json::to_string(&event) {
                    println!("{line}");
                }
            }
        }
        ReportFormat::Text => print!("{}", render_text(run, opts.ascii)),
    }
}

/// `task.log` per task in index order, then `run.summary` and `run.end`.
pub fn report_events(run: &BenchmarkRun) -> Vec<BenchEvent> {
    let mut events: Vec<BenchEvent> = run
        .results
        .iter()
        .map(|log| {
            BenchEvent::new(
                "task.log",
                Some(log.index),
                serde_json::json!({
                    "complete": log.is_complete(),
                    "steps": log.steps,
                }),
            )
        })
        .collect();

    let summary = summarize(run);
    events.push(BenchEvent::new(
        "run.summary",
        None,
        serde_json::to_value(&summary).unwrap_or_default(),
    ));
    events.push(BenchEvent::new(
        "run.end",
        None,
        serde_json::json!({
            "backend": run.backend,
            "task_count": run.task_count,
            "concurrency": run.concurrency_limit,
            "completed": run.completed(),
            "failed": run.failed(),
            "total_elapsed_ms": run.total_elapsed.as_secs_f64() * 1000.0,
        }),
    ));
    events
}

pub fn render_text(run: &BenchmarkRun, ascii: bool) -> String {
    let mut out = String::new();

    for log in &run.results {
        let _ = writeln!(out, "Logs for {}:", task_dir_name(log.index));
        for result in &log.steps {
            let _ = writeln!(out, "{}", format_step(result, ascii));
        }
    }

    out.push('\n');
    out.push_str(&render_summary(&summarize(run)));
    let _ = writeln!(
        out,
        "Tasks: {} completed, {} failed (backend: {}, concurrency: {})",
        run.completed(),
        run.failed(),
        run.backend,
        run.concurrency_limit
    );
    let _ = writeln!(out, "Completed git bench in {:.3?}", run.total_elapsed);
    out
}

fn format_step(result: &StepResult, ascii: bool) -> String {
    let marker = match (result.success, ascii) {
        (true, true) => "OK  ",
        (false, true) => "FAIL",
        (true, false) => "✅",
        (false, false) => "❌",
    };
    format!(
        "  {} {:<15} {:>12}  {}",
        marker,
        result.step.label(),
        format!("{:.3?}", result.duration),
        result.message
    )
}

fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::from("Step summary:\n");
    let _ = writeln!(
        out,
        "  {:<15} {:>5} {:>6} {:>12} {:>12} {:>12}",
        "step", "runs", "failed", "min", "mean", "max"
    );
    for s in &summary.steps {
        let _ = writeln!(
            out,
            "  {:<15} {:>5} {:>6} {:>12} {:>12} {:>12}",
            s.step.label(),
            s.runs,
            s.failures,
            format!("{:.3?}", s.min),
            format!("{:.3?}", s.mean),
            format!("{:.3?}", s.max)
        );
    }
    out
}
