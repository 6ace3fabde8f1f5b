use std::collections::HashMap;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::types::{task_dir_name, StepName};

/// Visual progress monitor for a benchmark run
///
/// Shows one overall bar plus a spinner per in-flight task naming its current step
pub struct ProgressMonitor {
    /// Multi-progress container
    multi: MultiProgress,
    /// Overall progress bar
    overall: ProgressBar,
    /// Per-task progress spinners, keyed by task index
    task_bars: HashMap<usize, ProgressBar>,
    /// Whether monitoring is enabled
    enabled: bool,
}

impl ProgressMonitor {
    /// Create a new progress monitor
    ///
    /// # Arguments
    ///
    /// * `total_tasks` - Total number of tasks to execute
    /// * `enabled` - Whether to enable visual progress (disabled for jsonl output)
    pub fn new(total_tasks: usize, enabled: bool) -> Self {
        if !enabled {
            return Self::disabled();
        }

        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(total_tasks as u64));

        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tasks ({percent}%) {msg}")
        {
            overall.set_style(style.progress_chars("█▓▒░  "));
        }

        overall.set_message("Starting...");

        Self {
            multi,
            overall,
            task_bars: HashMap::new(),
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            multi: MultiProgress::new(),
            overall: ProgressBar::hidden(),
            task_bars: HashMap::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Tasks with a live spinner.
    pub fn in_flight(&self) -> usize {
        self.task_bars.len()
    }

    /// Tasks counted on the overall bar.
    pub fn finished(&self) -> u64 {
        self.overall.position()
    }

    /// Add a task and create its progress spinner
    pub fn add_task(&mut self, index: usize) {
        if !self.enabled {
            return;
        }

        let bar = self.multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.green} {msg}") {
            bar.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        bar.set_message(format!("⏳ {}", task_dir_name(index)));
        bar.enable_steady_tick(Duration::from_millis(100));

        self.task_bars.insert(index, bar);
    }

    /// Show the step a task is currently running
    pub fn set_step(&self, index: usize, step: StepName) {
        if let Some(bar) = self.task_bars.get(&index) {
            bar.set_message(format!("⏳ {}: {}", task_dir_name(index), step.label()));
        }
    }

    /// Mark a task as completed
    pub fn complete_task(&mut self, index: usize, success: bool, elapsed: Duration) {
        if !self.enabled {
            return;
        }

        if let Some(bar) = self.task_bars.remove(&index) {
            let icon = if success { "✅" } else { "❌" };
            bar.finish_with_message(format!("{} {} ({:.3?})", icon, task_dir_name(index), elapsed));
        }

        self.overall.inc(1);
    }

    /// Update overall progress message
    pub fn set_message(&self, msg: &str) {
        if self.enabled {
            self.overall.set_message(msg.to_string());
        }
    }

    /// Finish overall progress
    pub fn finish(&self, failed: usize) {
        if !self.enabled {
            return;
        }

        let msg = if failed == 0 {
            "✅ All tasks completed".to_string()
        } else {
            format!("❌ {} task(s) failed", failed)
        };

        self.overall.finish_with_message(msg);
    }

    /// Clear all progress indicators (cleanup)
    pub fn clear(&self) {
        if self.enabled {
            self.overall.finish_and_clear();
        }
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        // Ensure all spinners are cleaned up
        for (_, bar) in self.task_bars.drain() {
            bar.finish_and_clear();
        }
    }
}
