//! Core of the git-bench harness: data model, backend trait, workflow
//! executor, scheduler and reporting.

pub mod backend;
pub mod config;
pub mod error;
pub mod executor;
pub mod util;

pub use backend::{BackendKind, CommitSpec, GitBackend};
pub use error::{BackendError, CliError, CollectorError, ExecutorError};
