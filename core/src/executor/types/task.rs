use std::path::{Path, PathBuf};

/// One benchmark iteration. Immutable once the scheduler has built it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub index: usize,
    pub repo_url: String,
    pub work_dir: PathBuf,
}

impl Task {
    /// Build task `index` with its isolated directory under `base_dir`.
    pub fn new(index: usize, repo_url: impl Into<String>, base_dir: &Path) -> Self {
        Self {
            index,
            repo_url: repo_url.into(),
            work_dir: base_dir.join(task_dir_name(index)),
        }
    }
}

pub fn task_dir_name(index: usize) -> String {
    format!("repo_{index}")
}
