// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace data model.
//!
//! A workspace is an isolated checkout: a git worktree plus a sibling
//! storage directory. This module only holds the shape of a workspace
//! record; lifecycle (create/resolve/list/remove) lives in `amux-workspace`.

use crate::ids::{HolderId, SessionId, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// On-disk consistency of a workspace's two directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceConsistency {
    /// Both the worktree and storage directory exist.
    Consistent,
    /// The storage directory is missing.
    FolderMissing,
    /// The git worktree directory is missing.
    WorktreeMissing,
    /// Both paths are gone; metadata survives only so it can be pruned.
    Orphaned,
}

impl fmt::Display for WorkspaceConsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkspaceConsistency::Consistent => "consistent",
            WorkspaceConsistency::FolderMissing => "folder-missing",
            WorkspaceConsistency::WorktreeMissing => "worktree-missing",
            WorkspaceConsistency::Orphaned => "orphaned",
        };
        write!(f, "{s}")
    }
}

/// One holder of a workspace's semaphore slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holder {
    pub holder_id: HolderId,
    pub session_id: Option<SessionId>,
    pub description: String,
    pub acquired_at: u64,
}

/// A workspace record as persisted in `workspace.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub short_index: u32,
    pub name: String,
    pub description: String,
    pub branch: String,
    pub base_branch: String,
    pub worktree_path: PathBuf,
    pub storage_path: PathBuf,
    pub created_at: u64,
    pub updated_at: u64,
    pub auto_created: bool,
    #[serde(default)]
    pub consistency: Option<WorkspaceConsistency>,
}

impl Workspace {
    /// Worktree and storage paths must never coincide.
    /// The holder set itself lives in the sibling `semaphore.yaml` (see
    /// `amux_workspace::semaphore`), not inline on this record, so that
    /// acquiring/releasing a holder never requires rewriting the whole
    /// workspace document.
    pub fn storage_and_worktree_distinct(&self) -> bool {
        self.worktree_path != self.storage_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worktree_and_storage_paths_must_differ() {
        let ws = Workspace {
            id: WorkspaceId::new("w1"),
            short_index: 1,
            name: "w1".into(),
            description: String::new(),
            branch: "amux/w1".into(),
            base_branch: "main".into(),
            worktree_path: PathBuf::from("/tmp/a/worktree"),
            storage_path: PathBuf::from("/tmp/a/storage"),
            created_at: 0,
            updated_at: 0,
            auto_created: false,
            consistency: None,
        };
        assert!(ws.storage_and_worktree_distinct());
    }

    #[test]
    fn consistency_display_matches_spec_vocabulary() {
        assert_eq!(
            WorkspaceConsistency::FolderMissing.to_string(),
            "folder-missing"
        );
        assert_eq!(WorkspaceConsistency::Orphaned.to_string(), "orphaned");
    }
}
