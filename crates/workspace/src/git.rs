// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git capability injected into the workspace manager, kept
//! behind a trait so worktree creation/removal can be faked in tests
//! without touching a real repository.

use amux_runtime::subprocess::{run_with_timeout, GIT_WORKTREE_TIMEOUT};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("not a git repository: {0}")]
    NotARepo(PathBuf),
    #[error("git worktree add failed: {0}")]
    AddFailed(String),
    #[error("git worktree remove failed: {0}")]
    RemoveFailed(String),
}

#[async_trait]
pub trait GitCapability: Send + Sync + 'static {
    async fn find_repo_root(&self, from: &Path) -> Result<PathBuf, GitError>;

    async fn create_worktree(
        &self,
        repo_root: &Path,
        worktree_path: &Path,
        branch: &str,
        base_branch: &str,
    ) -> Result<(), GitError>;

    async fn remove_worktree(&self, repo_root: &Path, worktree_path: &Path) -> Result<(), GitError>;
}

#[derive(Clone, Default)]
pub struct RealGitCapability;

impl RealGitCapability {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GitCapability for RealGitCapability {
    async fn find_repo_root(&self, from: &Path) -> Result<PathBuf, GitError> {
        let mut cmd = Command::new("git");
        cmd.current_dir(from).args(["rev-parse", "--show-toplevel"]);
        let output = run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git rev-parse")
            .await
            .map_err(|_| GitError::NotARepo(from.to_path_buf()))?;
        if !output.status.success() {
            return Err(GitError::NotARepo(from.to_path_buf()));
        }
        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(PathBuf::from(path))
    }

    async fn create_worktree(
        &self,
        repo_root: &Path,
        worktree_path: &Path,
        branch: &str,
        base_branch: &str,
    ) -> Result<(), GitError> {
        if let Some(parent) = worktree_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GitError::AddFailed(e.to_string()))?;
        }

        let mut cmd = Command::new("git");
        cmd.current_dir(repo_root)
            .args(["worktree", "add", "-b", branch, &worktree_path.display().to_string(), base_branch])
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE");

        let output = run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git worktree add")
            .await
            .map_err(GitError::AddFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::AddFailed(stderr.trim().to_string()));
        }
        Ok(())
    }

    async fn remove_worktree(&self, repo_root: &Path, worktree_path: &Path) -> Result<(), GitError> {
        let mut cmd = Command::new("git");
        cmd.current_dir(repo_root)
            .args(["worktree", "remove", "--force", &worktree_path.display().to_string()]);

        let output = run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git worktree remove")
            .await
            .map_err(GitError::RemoveFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::RemoveFailed(stderr.trim().to_string()));
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeGitCapability {
        worktrees: Arc<Mutex<HashSet<PathBuf>>>,
        repo_root: Arc<Mutex<Option<PathBuf>>>,
    }

    impl FakeGitCapability {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_repo_root(&self, root: PathBuf) {
            *self.repo_root.lock() = Some(root);
        }

        pub fn worktree_exists(&self, path: &Path) -> bool {
            self.worktrees.lock().contains(path)
        }
    }

    #[async_trait]
    impl GitCapability for FakeGitCapability {
        async fn find_repo_root(&self, from: &Path) -> Result<PathBuf, GitError> {
            Ok(self.repo_root.lock().clone().unwrap_or_else(|| from.to_path_buf()))
        }

        async fn create_worktree(
            &self,
            _repo_root: &Path,
            worktree_path: &Path,
            _branch: &str,
            _base_branch: &str,
        ) -> Result<(), GitError> {
            tokio::fs::create_dir_all(worktree_path)
                .await
                .map_err(|e| GitError::AddFailed(e.to_string()))?;
            self.worktrees.lock().insert(worktree_path.to_path_buf());
            Ok(())
        }

        async fn remove_worktree(&self, _repo_root: &Path, worktree_path: &Path) -> Result<(), GitError> {
            self.worktrees.lock().remove(worktree_path);
            let _ = tokio::fs::remove_dir_all(worktree_path).await;
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeGitCapability;
