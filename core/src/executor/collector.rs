use std::sync::OnceLock;

use crate::error::CollectorError;

use super::types::WorkflowLog;

/// Index-addressed, write-once storage for per-task logs.
///
/// Slots are pre-allocated for the whole run, so executors writing different
/// indices never contend. Reads are only meaningful after the scheduler's
/// join barrier.
#[derive(Debug)]
pub struct ResultCollector {
    slots: Vec<OnceLock<WorkflowLog>>,
}

impl ResultCollector {
    pub fn new(task_count: usize) -> Self {
        Self {
            slots: (0..task_count).map(|_| OnceLock::new()).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Store `log` in slot `index`. A slot can be written exactly once.
    pub fn record(&self, index: usize, log: WorkflowLog) -> Result<(), CollectorError> {
        let slot = self.slots.get(index).ok_or(CollectorError::OutOfRange {
            index,
            capacity: self.slots.len(),
        })?;
        slot.set(log).map_err(|_| CollectorError::AlreadyRecorded(index))
    }

    pub fn is_recorded(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.get().is_some())
    }

    pub fn recorded(&self) -> usize {
        self.slots.iter().filter(|s| s.get().is_some()).count()
    }

    /// Recorded logs in index order.
    pub fn snapshot(&self) -> Vec<(usize, &WorkflowLog)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.get().map(|log| (i, log)))
            .collect()
    }

    /// Consume the collector, requiring every slot to be filled.
    pub fn into_logs(self) -> Result<Vec<WorkflowLog>, CollectorError> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(i, s)| s.into_inner().ok_or(CollectorError::Missing(i)))
            .collect()
    }
}
