use clap::Parser;

use gitbench_core::backend::BackendKind;
use gitbench_core::executor::ReportFormat;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    Process,
    Library,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Process => BackendKind::Process,
            BackendArg::Library => BackendKind::Library,
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Text,
    Jsonl,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Jsonl => ReportFormat::Jsonl,
        }
    }
}

/// Time a clone / branch / commit / push workflow run many times in parallel.
#[derive(Parser, Debug)]
#[command(name = "git-bench", version)]
pub struct Args {
    /// Git repository URL
    #[arg(long)]
    pub repo: Option<String>,

    /// Number of workflows allowed to run at the same time
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Number of workflows to run
    #[arg(long)]
    pub count: Option<usize>,

    /// Which git implementation runs the workflow
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Shorthand for `--backend library`
    #[arg(long, conflicts_with = "backend")]
    pub use_library: bool,

    /// SSH private key for the library backend
    #[arg(long)]
    pub ssh_key: Option<String>,

    /// git executable for the process backend
    #[arg(long)]
    pub git_bin: Option<String>,

    /// Base directory for per-task checkouts (default: ./git-bench-tmp)
    #[arg(long)]
    pub work_dir: Option<String>,

    /// Leave the checkouts on disk after the run
    #[arg(long)]
    pub keep_work_dir: bool,

    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    pub format: FormatArg,

    #[arg(long)]
    pub no_progress: bool,

    /// ASCII-only status markers
    #[arg(long)]
    pub ascii: bool,

    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn backend_kind(&self) -> Option<BackendKind> {
        if self.use_library {
            return Some(BackendKind::Library);
        }
        self.backend.map(BackendKind::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let args = Args::try_parse_from(["git-bench", "--repo", "git@host:r.git"]).unwrap();
        assert_eq!(args.repo.as_deref(), Some("git@host:r.git"));
        assert_eq!(args.concurrency, None);
        assert_eq!(args.count, None);
        assert_eq!(args.backend_kind(), None);
        assert_eq!(args.format, FormatArg::Text);
    }

    #[test]
    fn test_library_flags() {
        let args = Args::try_parse_from([
            "git-bench",
            "--repo",
            "r",
            "--use-library",
            "--ssh-key",
            "/k",
            "--concurrency",
            "4",
            "--count",
            "10",
        ])
        .unwrap();
        assert_eq!(args.backend_kind(), Some(BackendKind::Library));
        assert_eq!(args.ssh_key.as_deref(), Some("/k"));
        assert_eq!(args.concurrency, Some(4));
        assert_eq!(args.count, Some(10));
    }

    #[test]
    fn test_use_library_conflicts_with_backend() {
        let res = Args::try_parse_from([
            "git-bench",
            "--use-library",
            "--backend",
            "process",
        ]);
        assert!(res.is_err());
    }
}
