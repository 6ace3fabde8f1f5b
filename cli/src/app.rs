//! Application wiring: merge flags over config, build the backend and work
//! area, run the scheduler and print the report.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gitbench_core::backend::BackendKind;
use gitbench_core::config::AppConfig;
use gitbench_core::error::CliError;
use gitbench_core::executor::{
    emit_report, BenchPlan, ReportFormat, ReportOpts, TaskScheduler, WorkflowExecutor,
};
use gitbench_core::util::OsIdSource;
use gitbench_plugins::{build_backend, BackendOptions};

use crate::commands::cli::Args;
use crate::work_area::WorkArea;

const DEFAULT_WORK_DIR: &str = "git-bench-tmp";

/// Fully resolved inputs of one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchSettings {
    pub plan: BenchPlan,
    pub backend: BackendOptions,
    pub keep_work_dir: bool,
    pub report: ReportOpts,
}

/// Command line flags take precedence over config values.
pub fn resolve_settings(
    args: &Args,
    cfg: &AppConfig,
    cwd: &Path,
) -> Result<BenchSettings, CliError> {
    let repo_url = args
        .repo
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CliError::Config("Repository URL is required (--repo)".to_string()))?
        .to_string();

    let mut backend = BackendOptions::from(&cfg.bench);
    if let Some(kind) = args.backend_kind() {
        backend.kind = kind;
    }
    if let Some(bin) = &args.git_bin {
        backend.git_bin = bin.clone();
    }
    if let Some(key) = &args.ssh_key {
        backend.ssh_key = Some(PathBuf::from(key));
    }
    if backend.kind == BackendKind::Library && backend.ssh_key.is_none() {
        return Err(CliError::Config(
            "SSH key is required when using the library backend (--ssh-key)".to_string(),
        ));
    }

    let base_dir = args
        .work_dir
        .as_ref()
        .or(cfg.bench.work_dir.as_ref())
        .map(PathBuf::from)
        .unwrap_or_else(|| cwd.join(DEFAULT_WORK_DIR));

    let plan = BenchPlan {
        repo_url,
        base_dir,
        task_count: args.count.unwrap_or(cfg.bench.count),
        concurrency_limit: args.concurrency.unwrap_or(cfg.bench.concurrency),
    };
    plan.validate().map_err(|e| CliError::Config(e.to_string()))?;

    let format = ReportFormat::from(args.format);
    Ok(BenchSettings {
        plan,
        backend,
        keep_work_dir: args.keep_work_dir,
        report: ReportOpts::new(format, args.ascii, args.quiet, args.no_progress),
    })
}

#[tracing::instrument(name = "cli.run_app", skip(args, cfg))]
pub async fn run_app(args: Args, cfg: AppConfig) -> Result<i32, CliError> {
    let cwd = std::env::current_dir()?;
    let settings = resolve_settings(&args, &cfg, &cwd)?;

    let backend =
        build_backend(&settings.backend).map_err(|e| CliError::Config(format!("{e:#}")))?;
    tracing::info!(
        backend = backend.name(),
        repo = %settings.plan.repo_url,
        count = settings.plan.task_count,
        concurrency = settings.plan.concurrency_limit,
        "starting git bench"
    );

    let area = WorkArea::create(
        &settings.plan.base_dir,
        settings.plan.task_count,
        settings.keep_work_dir,
    )?;

    let executor = WorkflowExecutor::new(backend, Arc::new(OsIdSource), cfg.workflow.clone());
    let scheduler = TaskScheduler::new(executor).with_progress(settings.report.progress_bar);
    let run = scheduler.run(&settings.plan).await?;

    emit_report(&run, &settings.report);
    drop(area);

    Ok(0)
}
