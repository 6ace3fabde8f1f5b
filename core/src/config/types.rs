use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub bench: BenchConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "gitbench_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Defaults for the harness itself. Command line flags take precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    #[serde(default = "default_one")]
    pub concurrency: usize,

    #[serde(default = "default_one")]
    pub count: usize,

    #[serde(default)]
    pub backend: BackendKind,

    /// Executable used by the process backend.
    #[serde(default = "default_git_bin")]
    pub git_bin: String,

    /// Private key used by the library backend for clone and push.
    #[serde(default)]
    pub ssh_key: Option<String>,

    /// Passphrase protecting `ssh_key`, if any.
    #[serde(default)]
    pub ssh_passphrase: Option<String>,

    /// Base directory for per-task checkouts. Defaults to `./git-bench-tmp`.
    #[serde(default)]
    pub work_dir: Option<String>,
}

fn default_one() -> usize {
    1
}

fn default_git_bin() -> String {
    "git".to_string()
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_one(),
            count: default_one(),
            backend: BackendKind::default(),
            git_bin: default_git_bin(),
            ssh_key: None,
            ssh_passphrase: None,
            work_dir: None,
        }
    }
}

/// Fixed inputs of the per-task workflow. Constant across every task of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_email")]
    pub author_email: String,

    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    #[serde(default = "default_file_content")]
    pub file_content: String,

    #[serde(default = "default_remote")]
    pub remote: String,
}

fn default_commit_message() -> String {
    "Test commit".to_string()
}

fn default_author_name() -> String {
    "git-bench".to_string()
}

fn default_author_email() -> String {
    "git-bench@example.com".to_string()
}

fn default_file_extension() -> String {
    "txt".to_string()
}

fn default_file_content() -> String {
    "This is a test file".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            commit_message: default_commit_message(),
            author_name: default_author_name(),
            author_email: default_author_email(),
            file_extension: default_file_extension(),
            file_content: default_file_content(),
            remote: default_remote(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.bench.concurrency, 1);
        assert_eq!(cfg.bench.count, 1);
        assert_eq!(cfg.bench.backend, BackendKind::Process);
        assert_eq!(cfg.bench.git_bin, "git");
        assert_eq!(cfg.workflow, WorkflowConfig::default());
        assert!(cfg.logging.console);
        assert!(!cfg.logging.file);
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
[bench]
concurrency = 4
backend = "library"
ssh_key = "/tmp/id_ed25519"

[workflow]
commit_message = "bench commit"
"#,
        )
        .unwrap();

        assert_eq!(cfg.bench.concurrency, 4);
        assert_eq!(cfg.bench.count, 1);
        assert_eq!(cfg.bench.backend, BackendKind::Library);
        assert_eq!(cfg.bench.ssh_key.as_deref(), Some("/tmp/id_ed25519"));
        assert_eq!(cfg.workflow.commit_message, "bench commit");
        assert_eq!(cfg.workflow.author_name, "git-bench");
    }
}
