use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use gitbench_core::backend::{BackendKind, GitBackend};
use gitbench_core::config::BenchConfig;

use crate::backend::{LibraryBackend, ProcessBackend, SshIdentity};

/// Everything needed to construct a backend, resolved from config and flags.
#[derive(Debug, Clone)]
pub struct BackendOptions {
    pub kind: BackendKind,
    pub git_bin: String,
    pub ssh_key: Option<PathBuf>,
    pub ssh_passphrase: Option<String>,
}

impl From<&BenchConfig> for BackendOptions {
    fn from(cfg: &BenchConfig) -> Self {
        Self {
            kind: cfg.backend,
            git_bin: cfg.git_bin.clone(),
            ssh_key: cfg.ssh_key.as_ref().map(PathBuf::from),
            ssh_passphrase: cfg.ssh_passphrase.clone(),
        }
    }
}

/// Build the backend shared by every task of a run.
///
/// The library backend needs a readable SSH private key; its absence is a
/// configuration error, reported before any task starts.
pub fn build_backend(opts: &BackendOptions) -> Result<Arc<dyn GitBackend>> {
    match opts.kind {
        BackendKind::Process => Ok(Arc::new(ProcessBackend::new(opts.git_bin.clone()))),
        BackendKind::Library => {
            let identity = ssh_identity(opts)?;
            tracing::info!("library backend using key {}", identity.private_key().display());
            Ok(Arc::new(LibraryBackend::new(identity)))
        }
    }
}

fn ssh_identity(opts: &BackendOptions) -> Result<SshIdentity> {
    let key = opts
        .ssh_key
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("SSH key is required for the library backend"))?;
    let identity = SshIdentity::from_path(key)?;
    Ok(match &opts.ssh_passphrase {
        Some(passphrase) => identity.with_passphrase(passphrase.clone()),
        None => identity,
    })
}
