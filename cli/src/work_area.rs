use std::path::{Path, PathBuf};

use gitbench_core::error::CliError;
use gitbench_core::executor::types::task_dir_name;

/// Base directory holding every task checkout, removed when dropped.
///
/// A directory that already existed before the run is kept; only the task
/// directories inside it are removed.
#[derive(Debug)]
pub struct WorkArea {
    path: PathBuf,
    task_count: usize,
    created: bool,
    keep: bool,
}

impl WorkArea {
    pub fn create(path: &Path, task_count: usize, keep: bool) -> Result<Self, CliError> {
        let created = !path.exists();
        std::fs::create_dir_all(path).map_err(|e| {
            CliError::WorkArea(format!(
                "failed to create base directory {}: {e}",
                path.display()
            ))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            task_count,
            created,
            keep,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn cleanup(&self) -> std::io::Result<()> {
        if self.created {
            return std::fs::remove_dir_all(&self.path);
        }
        for index in 0..self.task_count {
            let dir = self.path.join(task_dir_name(index));
            if dir.exists() {
                std::fs::remove_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}

impl Drop for WorkArea {
    fn drop(&mut self) {
        if self.keep {
            tracing::info!("keeping work area {}", self.path.display());
            return;
        }
        if let Err(e) = self.cleanup() {
            tracing::warn!("failed to remove work area {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_area_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let base = root.path().join("git-bench-tmp");

        let area = WorkArea::create(&base, 2, false).unwrap();
        std::fs::create_dir_all(area.path().join("repo_0")).unwrap();
        assert!(base.is_dir());
        drop(area);

        assert!(!base.exists());
    }

    #[test]
    fn test_existing_area_only_loses_task_dirs() {
        let root = tempfile::tempdir().unwrap();
        let base = root.path().to_path_buf();
        std::fs::write(base.join("notes.txt"), "keep me").unwrap();

        let area = WorkArea::create(&base, 2, false).unwrap();
        std::fs::create_dir_all(base.join("repo_0")).unwrap();
        std::fs::create_dir_all(base.join("repo_1")).unwrap();
        drop(area);

        assert!(base.join("notes.txt").exists());
        assert!(!base.join("repo_0").exists());
        assert!(!base.join("repo_1").exists());
    }

    #[test]
    fn test_keep_leaves_everything() {
        let root = tempfile::tempdir().unwrap();
        let base = root.path().join("bench");

        drop(WorkArea::create(&base, 1, true).unwrap());
        assert!(base.is_dir());
    }

    #[test]
    fn test_uncreatable_base_is_work_area_error() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("file");
        std::fs::write(&file, "x").unwrap();

        let err = WorkArea::create(&file.join("sub"), 1, false).unwrap_err();
        assert!(matches!(err, CliError::WorkArea(_)));
    }
}
