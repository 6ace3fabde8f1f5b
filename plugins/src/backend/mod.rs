mod library;
mod process;

pub use library::{LibraryBackend, SshIdentity};
pub use process::ProcessBackend;
