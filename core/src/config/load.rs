use std::path::{Path, PathBuf};

use anyhow::Context;

use super::types::AppConfig;

/// Get the default data directory: ~/.git-bench
pub fn get_bench_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".git-bench"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.git-bench/config.toml (highest)
    let user_config = get_bench_data_dir()?.join("config.toml");

    // Priority 2: ./git-bench.toml (current directory)
    let local_config = Path::new("git-bench.toml");

    let mut cfg = if user_config.exists() {
        load_from_path(&user_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

// Environment variable overrides (Priority 0: highest)
fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("GIT_BENCH_GIT_BIN") {
        cfg.bench.git_bin = v;
    }
    if let Some(v) = non_empty("GIT_BENCH_BACKEND") {
        cfg.bench.backend = v
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid GIT_BENCH_BACKEND: {e}"))?;
    }
    if let Some(v) = non_empty("GIT_BENCH_SSH_KEY") {
        cfg.bench.ssh_key = Some(v);
    }
    if let Some(v) = lookup("GIT_BENCH_SSH_PASSPHRASE").filter(|v| !v.is_empty()) {
        cfg.bench.ssh_passphrase = Some(v);
    }
    if let Some(v) = non_empty("GIT_BENCH_WORK_DIR") {
        cfg.bench.work_dir = Some(v);
    }
    Ok(())
}
