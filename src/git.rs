//! Repository snapshots
//!
//! Extraction runs on a directory. A [`SnapshotProvider`] materializes a
//! repository branch into a temporary directory first; [`GitSnapshot`] does so
//! by cloning with git.

use std::path::Path;
use std::time::{Duration, Instant};

use git2::build::RepoBuilder;
use git2::{FetchOptions, RemoteCallbacks};
use tempfile::TempDir;

use crate::error::{ExtractError, Result};

/// Source of repository snapshots.
pub trait SnapshotProvider {
    /// Materialize `branch` of `url` into a fresh directory.
    fn acquire(&self, url: &str, branch: &str) -> Result<Snapshot>;
}

/// A checked-out repository. The directory is removed when this is dropped.
#[derive(Debug)]
pub struct Snapshot {
    dir: TempDir,
    url: String,
    branch: String,
}

impl Snapshot {
    pub fn new(dir: TempDir, url: &str, branch: &str) -> Self {
        Self {
            dir,
            url: url.to_string(),
            branch: branch.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }
}

/// Clones repositories with libgit2.
#[derive(Debug, Clone)]
pub struct GitSnapshot {
    depth: Option<u32>,
    timeout: Option<Duration>,
}

impl Default for GitSnapshot {
    fn default() -> Self {
        Self {
            depth: Some(1),
            timeout: None,
        }
    }
}

impl GitSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// History depth to fetch. `None` fetches full history, which local
    /// repositories need since their transport cannot do shallow fetches.
    pub fn with_depth(mut self, depth: Option<u32>) -> Self {
        self.depth = depth;
        self
    }

    /// Abort the clone once it has been transferring for longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl SnapshotProvider for GitSnapshot {
    fn acquire(&self, url: &str, branch: &str) -> Result<Snapshot> {
        let fail = |message: String| ExtractError::Snapshot {
            url: url.to_string(),
            message,
        };

        let dir = tempfile::Builder::new()
            .prefix("gleaner-")
            .tempdir()
            .map_err(|e| fail(e.to_string()))?;

        let started = Instant::now();
        let mut callbacks = RemoteCallbacks::new();
        if let Some(timeout) = self.timeout {
            // Returning false from the progress callback cancels the transfer.
            callbacks.transfer_progress(move |_| started.elapsed() < timeout);
        }

        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(callbacks);
        if let Some(depth) = self.depth {
            fetch.depth(i32::try_from(depth).unwrap_or(i32::MAX));
        }

        log::info!("cloning {} ({}) into {}", url, branch, dir.path().display());
        RepoBuilder::new()
            .branch(branch)
            .fetch_options(fetch)
            .clone(url, dir.path())
            .map_err(|err| match self.timeout {
                Some(timeout) if started.elapsed() >= timeout => fail(format!(
                    "clone timed out after {}",
                    humantime::format_duration(timeout)
                )),
                _ => fail(err.message().to_string()),
            })?;

        Ok(Snapshot::new(dir, url, branch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestRepo;

    fn origin() -> TestRepo {
        let repo = TestRepo::with_git();
        repo.add_file("src/app.py", "# entry point\nprint('hi')\n");
        repo.commit("initial");
        repo.rename_branch("main");
        repo
    }

    #[test]
    fn test_clone_local_repository() {
        let origin = origin();
        let url = origin.path().to_string_lossy().to_string();

        let snapshot = GitSnapshot::new()
            .with_depth(None)
            .acquire(&url, "main")
            .unwrap();

        assert!(snapshot.path().join("src/app.py").is_file());
        assert_eq!(snapshot.branch(), "main");
        assert_eq!(snapshot.url(), url);
    }

    #[test]
    fn test_snapshot_removed_on_drop() {
        let origin = origin();
        let url = origin.path().to_string_lossy().to_string();

        let snapshot = GitSnapshot::new().with_depth(None).acquire(&url, "main").unwrap();
        let path = snapshot.path().to_path_buf();
        assert!(path.exists());
        drop(snapshot);
        assert!(!path.exists());
    }

    #[test]
    fn test_unknown_branch_fails() {
        let origin = origin();
        let url = origin.path().to_string_lossy().to_string();

        let result = GitSnapshot::new().with_depth(None).acquire(&url, "no-such-branch");
        assert!(matches!(result, Err(ExtractError::Snapshot { .. })));
    }

    #[test]
    fn test_missing_repository_fails() {
        let result = GitSnapshot::new().acquire("/nonexistent/gleaner/repo", "main");
        match result {
            Err(ExtractError::Snapshot { url, .. }) => assert_eq!(url, "/nonexistent/gleaner/repo"),
            other => panic!("expected snapshot error, got {:?}", other.map(|s| s.path().to_path_buf())),
        }
    }
}
