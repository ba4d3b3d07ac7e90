// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace Manager: isolated checkouts backed by git
//! worktrees, each with a sibling storage directory and a holder semaphore.

pub mod git;
pub mod manager;
pub mod semaphore;

pub use git::{GitCapability, GitError, RealGitCapability};
pub use manager::{CreateOptions, ListOptions, RemoveOptions, WorkspaceManager};
pub use semaphore::{HolderRecord, SemaphoreError, SemaphoreState, WorkspaceSemaphore};

#[cfg(any(test, feature = "test-support"))]
pub use git::FakeGitCapability;
