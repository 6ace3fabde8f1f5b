use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    Cred, CredentialType, FetchOptions, IndexAddOption, PushOptions, RemoteCallbacks, Repository,
    Signature,
};

use gitbench_core::backend::{BackendResult, CommitSpec, GitBackend};
use gitbench_core::error::BackendError;

const DEFAULT_SSH_USER: &str = "git";
const MAX_AUTH_ATTEMPTS: u32 = 3;

/// SSH identity used for clone and push.
#[derive(Debug, Clone)]
pub struct SshIdentity {
    private_key: PathBuf,
    passphrase: Option<String>,
}

impl SshIdentity {
    /// Load the identity from a private key file, which must be readable.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        std::fs::File::open(path)
            .with_context(|| format!("failed to read private key {}", path.display()))?;
        Ok(Self {
            private_key: path.to_path_buf(),
            passphrase: None,
        })
    }

    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    pub fn private_key(&self) -> &Path {
        &self.private_key
    }

    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref()
    }

    /// Callbacks answering credential requests with this key.
    ///
    /// libgit2 re-asks after a rejected key, so attempts are capped.
    fn callbacks(&self) -> RemoteCallbacks<'_> {
        let attempts = Cell::new(0u32);
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, username, allowed| {
            attempts.set(attempts.get() + 1);
            if attempts.get() > MAX_AUTH_ATTEMPTS {
                return Err(git2::Error::from_str("ssh authentication failed"));
            }

            let user = username.unwrap_or(DEFAULT_SSH_USER);
            if allowed.contains(CredentialType::USERNAME) {
                return Cred::username(user);
            }
            Cred::ssh_key(
                user,
                None,
                &self.private_key,
                self.passphrase.as_deref(),
            )
        });
        callbacks
    }
}

/// Runs every step in-process through libgit2.
///
/// libgit2 calls block, so each step runs on tokio's blocking pool.
pub struct LibraryBackend {
    identity: Arc<SshIdentity>,
}

impl LibraryBackend {
    pub fn new(identity: SshIdentity) -> Self {
        Self {
            identity: Arc::new(identity),
        }
    }

    async fn blocking<F>(&self, f: F) -> BackendResult
    where
        F: FnOnce(&SshIdentity) -> Result<(), git2::Error> + Send + 'static,
    {
        let identity = self.identity.clone();
        tokio::task::spawn_blocking(move || f(&identity))
            .await
            .map_err(|e| BackendError::Worker(e.to_string()))?
            .map_err(|e| BackendError::Library(e.message().to_string()))
    }
}

#[async_trait]
impl GitBackend for LibraryBackend {
    fn name(&self) -> &str {
        "library"
    }

    async fn acquire(&self, repo_url: &str, work_dir: &Path) -> BackendResult {
        let url = repo_url.to_string();
        let dir = work_dir.to_path_buf();
        self.blocking(move |identity| {
            let mut fetch = FetchOptions::new();
            fetch.remote_callbacks(identity.callbacks());
            RepoBuilder::new().fetch_options(fetch).clone(&url, &dir)?;
            Ok(())
        })
        .await
    }

    async fn branch(&self, work_dir: &Path, branch: &str) -> BackendResult {
        let dir = work_dir.to_path_buf();
        let branch = branch.to_string();
        self.blocking(move |_| {
            let repo = Repository::open(&dir)?;
            let head = repo.head()?.peel_to_commit()?;
            repo.branch(&branch, &head, false)?;
            repo.set_head(&format!("refs/heads/{branch}"))?;
            repo.checkout_head(Some(CheckoutBuilder::new().safe()))?;
            Ok(())
        })
        .await
    }

    async fn stage(&self, work_dir: &Path) -> BackendResult {
        let dir = work_dir.to_path_buf();
        self.blocking(move |_| {
            let repo = Repository::open(&dir)?;
            let mut index = repo.index()?;
            index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
            index.update_all(["*"].iter(), None)?;
            index.write()?;
            Ok(())
        })
        .await
    }

    async fn commit(&self, work_dir: &Path, commit: &CommitSpec) -> BackendResult {
        let dir = work_dir.to_path_buf();
        let commit = commit.clone();
        self.blocking(move |_| {
            let repo = Repository::open(&dir)?;
            let sig = Signature::now(&commit.author_name, &commit.author_email)?;
            let tree_id = repo.index()?.write_tree()?;
            let tree = repo.find_tree(tree_id)?;
            let parent = repo.head()?.peel_to_commit()?;
            repo.commit(Some("HEAD"), &sig, &sig, &commit.message, &tree, &[&parent])?;
            Ok(())
        })
        .await
    }

    async fn publish(&self, work_dir: &Path, remote: &str, branch: &str) -> BackendResult {
        let dir = work_dir.to_path_buf();
        let remote = remote.to_string();
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        self.blocking(move |identity| {
            let repo = Repository::open(&dir)?;
            let mut origin = repo.find_remote(&remote)?;

            let mut callbacks = identity.callbacks();
            callbacks.push_update_reference(|refname, status| match status {
                Some(msg) => Err(git2::Error::from_str(&format!(
                    "push of {refname} rejected: {msg}"
                ))),
                None => Ok(()),
            });

            let mut opts = PushOptions::new();
            opts.remote_callbacks(callbacks);
            origin.push(&[refspec.as_str()], Some(&mut opts))?;
            Ok(())
        })
        .await
    }
}
