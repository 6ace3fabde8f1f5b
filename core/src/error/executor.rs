use thiserror::Error;

/// Harness-level errors. Any of these aborts the whole benchmark run.
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("concurrency limit must be at least 1 (got {0})")]
    InvalidConcurrency(usize),

    #[error("task count must be at least 1 (got {0})")]
    InvalidTaskCount(usize),

    #[error("secure random source unavailable: {0}")]
    Randomness(String),

    #[error("result collection failed: {0}")]
    Collector(#[from] CollectorError),

    #[error("Runner error: {0}")]
    Runner(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CollectorError {
    #[error("task index {index} out of range for {capacity} slots")]
    OutOfRange { index: usize, capacity: usize },

    #[error("task index {0} already recorded")]
    AlreadyRecorded(usize),

    #[error("task index {0} never recorded a log")]
    Missing(usize),
}
