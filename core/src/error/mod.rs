#[allow(clippy::module_inception)]
pub mod error;
pub mod executor;

pub use error::{BackendError, CliError};
pub use executor::{CollectorError, ExecutorError};
