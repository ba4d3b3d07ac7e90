// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace Manager: create/resolve/list/remove isolated
//! checkouts backed by git worktrees, each paired with a sibling storage
//! directory and a holder semaphore.

use crate::git::GitCapability;
use crate::semaphore::WorkspaceSemaphore;
use amux_core::{AmuxError, Clock, EntityKind, HolderId, HookEvent, Result, SessionId, Workspace, WorkspaceConsistency, WorkspaceId};
use amux_hooks::{HookContext, HookEngine, HookResult};
use amux_storage::{FileManager, FileManagerError, IndexAllocator};
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const BRANCH_PREFIX: &str = "amux";

/// Inputs to `WorkspaceManager::create`.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub name: String,
    pub description: String,
    pub base_branch: Option<String>,
    pub auto_created: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// When true, orphaned/inconsistent entries are dropped instead of surfaced.
    pub consistent_only: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Bypass the "in use" refusal.
    pub force: bool,
}

/// Owns the `workspaces/` directory: one subdirectory per workspace holding
/// `workspace.yaml` and `semaphore.yaml`, plus the sibling worktree checked
/// out by the injected git capability.
pub struct WorkspaceManager {
    state_dir: PathBuf,
    git: Arc<dyn GitCapability>,
    hooks: Arc<HookEngine>,
    index: Arc<IndexAllocator>,
    file_manager: FileManager,
    clock: Arc<dyn Clock>,
}

impl WorkspaceManager {
    pub fn new(
        state_dir: impl Into<PathBuf>,
        git: Arc<dyn GitCapability>,
        hooks: Arc<HookEngine>,
        index: Arc<IndexAllocator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state_dir: state_dir.into(),
            git,
            hooks,
            index,
            file_manager: FileManager::default(),
            clock,
        }
    }

    fn workspace_dir(&self, id: &WorkspaceId) -> PathBuf {
        self.state_dir.join("workspaces").join(id.as_str())
    }

    fn metadata_path(&self, id: &WorkspaceId) -> PathBuf {
        self.workspace_dir(id).join("workspace.yaml")
    }

    fn worktree_path(&self, id: &WorkspaceId) -> PathBuf {
        self.state_dir.join("worktrees").join(id.as_str())
    }

    fn storage_path(&self, id: &WorkspaceId) -> PathBuf {
        self.workspace_dir(id).join("storage")
    }

    fn semaphore(&self, id: &WorkspaceId) -> WorkspaceSemaphore {
        WorkspaceSemaphore::new(self.workspace_dir(id).join("semaphore.yaml"))
    }

    /// Allocates an ID of the form `<slug>-<unix-seconds>-<4 hex chars>`
    ///.
    fn mint_id(&self, name: &str, now: u64) -> (WorkspaceId, String) {
        let slug = slugify(name, 32);
        let suffix = short_random_hex(4);
        let raw = format!("{slug}-{now}-{suffix}");
        let branch = format!("{BRANCH_PREFIX}/{raw}");
        (WorkspaceId::new(raw), branch)
    }

    pub async fn create(&self, repo_root: &Path, opts: CreateOptions) -> Result<Workspace> {
        let now = self.clock.now_secs();
        let (id, branch) = self.mint_id(&opts.name, now);
        let base_branch = opts.base_branch.unwrap_or_else(|| "main".to_string());

        let worktree_path = self.worktree_path(&id);
        let storage_path = self.storage_path(&id);

        self.git
            .create_worktree(repo_root, &worktree_path, &branch, &base_branch)
            .await
            .map_err(|e| AmuxError::External(e.into()))?;

        tokio::fs::create_dir_all(&storage_path)
            .await
            .map_err(AmuxError::Io)?;

        let short_index = self
            .index
            .acquire(EntityKind::Workspace, id.as_str())
            .map_err(|e| AmuxError::External(e.into()))?;

        let workspace = Workspace {
            id: id.clone(),
            short_index,
            name: opts.name.clone(),
            description: opts.description,
            branch,
            base_branch,
            worktree_path: worktree_path.clone(),
            storage_path,
            created_at: now,
            updated_at: now,
            auto_created: opts.auto_created,
            consistency: Some(WorkspaceConsistency::Consistent),
        };

        self.file_manager
            .write(&self.metadata_path(&id), &workspace)
            .map_err(|e| AmuxError::External(e.into()))?;

        let context = HookContext {
            project_root: repo_root.to_path_buf(),
            workspace_id: Some(id.to_string()),
            workspace_name: Some(workspace.name.clone()),
            workspace_path: Some(worktree_path.clone()),
            workspace_branch: Some(workspace.branch.clone()),
            workspace_base_branch: Some(workspace.base_branch.clone()),
            ..Default::default()
        };
        self.run_hooks_best_effort(HookEvent::WorkspaceCreate, &worktree_path, &context)
            .await;

        Ok(workspace)
    }

    fn read_metadata(&self, id: &WorkspaceId) -> std::result::Result<Option<Workspace>, FileManagerError> {
        match self.file_manager.read::<Workspace>(&self.metadata_path(id)) {
            Ok((ws, _)) => Ok(Some(ws)),
            Err(FileManagerError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Recomputes a workspace's on-disk consistency by checking whether its
    /// worktree and storage directories still exist.
    fn consistency_of(&self, ws: &Workspace) -> WorkspaceConsistency {
        let worktree_exists = ws.worktree_path.exists();
        let storage_exists = ws.storage_path.exists();
        match (worktree_exists, storage_exists) {
            (true, true) => WorkspaceConsistency::Consistent,
            (false, true) => WorkspaceConsistency::WorktreeMissing,
            (true, false) => WorkspaceConsistency::FolderMissing,
            (false, false) => WorkspaceConsistency::Orphaned,
        }
    }

    /// Tries an exact ID, then a short index, then a unique name match
    ///.
    pub fn resolve(&self, identifier: &str) -> Result<Workspace> {
        if let Some(mut ws) = self
            .read_metadata(&WorkspaceId::new(identifier))
            .map_err(|e| AmuxError::External(e.into()))?
        {
            ws.consistency = Some(self.consistency_of(&ws));
            return Ok(ws);
        }

        if let Ok(index) = identifier.parse::<u32>() {
            if let Ok(entity_id) = self.index.get_by_index(EntityKind::Workspace, index) {
                if let Some(mut ws) = self
                    .read_metadata(&WorkspaceId::new(entity_id))
                    .map_err(|e| AmuxError::External(e.into()))?
                {
                    ws.consistency = Some(self.consistency_of(&ws));
                    return Ok(ws);
                }
            }
        }

        let mut by_name = self
            .list(ListOptions::default())?
            .into_iter()
            .filter(|ws| ws.name == identifier);
        let first = by_name.next();
        match (first, by_name.next()) {
            (Some(ws), None) => Ok(ws),
            (Some(_), Some(_)) => Err(AmuxError::Ambiguous(identifier.to_string())),
            (None, _) => Err(AmuxError::NotFound(identifier.to_string())),
        }
    }

    /// Enumerates every workspace under `workspaces/`, recomputing
    /// consistency for each, and reconciles the short-index allocator
    /// against the surviving IDs.
    pub fn list(&self, opts: ListOptions) -> Result<Vec<Workspace>> {
        let root = self.state_dir.join("workspaces");
        let mut out = Vec::new();
        if root.exists() {
            let entries = std::fs::read_dir(&root).map_err(AmuxError::Io)?;
            for entry in entries {
                let entry = entry.map_err(AmuxError::Io)?;
                if !entry.file_type().map_err(AmuxError::Io)?.is_dir() {
                    continue;
                }
                let id = entry.file_name().to_string_lossy().to_string();
                if let Some(mut ws) = self
                    .read_metadata(&WorkspaceId::new(id))
                    .map_err(|e| AmuxError::External(e.into()))?
                {
                    ws.consistency = Some(self.consistency_of(&ws));
                    if opts.consistent_only && ws.consistency != Some(WorkspaceConsistency::Consistent) {
                        continue;
                    }
                    out.push(ws);
                }
            }
        }
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.as_str().cmp(b.id.as_str())));

        let live_ids: Vec<String> = out.iter().map(|ws| ws.id.to_string()).collect();
        let _ = self.index.reconcile(EntityKind::Workspace, &live_ids);

        Ok(out)
    }

    pub async fn remove(&self, repo_root: &Path, identifier: &str, opts: RemoveOptions) -> Result<()> {
        let ws = self.resolve(identifier)?;
        if !opts.force {
            let holders = self
                .semaphore(&ws.id)
                .holders()
                .map_err(|e| AmuxError::External(e.into()))?;
            if !holders.is_empty() {
                return Err(AmuxError::AlreadyInState(format!("workspace {} is in use", ws.id)));
            }
        }

        let context = HookContext {
            project_root: repo_root.to_path_buf(),
            workspace_id: Some(ws.id.to_string()),
            workspace_name: Some(ws.name.clone()),
            workspace_path: Some(ws.worktree_path.clone()),
            workspace_branch: Some(ws.branch.clone()),
            workspace_base_branch: Some(ws.base_branch.clone()),
            ..Default::default()
        };
        self.run_hooks_best_effort(HookEvent::WorkspaceRemove, &ws.worktree_path, &context)
            .await;

        if ws.worktree_path.exists() {
            self.git
                .remove_worktree(repo_root, &ws.worktree_path)
                .await
                .map_err(|e| AmuxError::External(e.into()))?;
        }

        let _ = std::fs::remove_dir_all(self.workspace_dir(&ws.id));
        let _ = self.index.release(EntityKind::Workspace, ws.short_index);
        Ok(())
    }

    pub fn acquire(&self, identifier: &str, holder_id: &HolderId, session_id: Option<SessionId>, description: &str) -> Result<()> {
        let ws = self.resolve(identifier)?;
        let now = self.clock.now_secs();
        self.semaphore(&ws.id)
            .acquire(holder_id, session_id, description, now)
            .map_err(|e| AmuxError::External(e.into()))
    }

    pub fn release(&self, identifier: &str, holder_id: &HolderId) -> Result<()> {
        let ws = self.resolve(identifier)?;
        self.semaphore(&ws.id).release(holder_id).map_err(|e| AmuxError::External(e.into()))
    }

    pub fn holders(&self, identifier: &str) -> Result<Vec<amux_core::Holder>> {
        let ws = self.resolve(identifier)?;
        self.semaphore(&ws.id)
            .holders()
            .map(|holders| {
                holders
                    .into_iter()
                    .map(|h| amux_core::Holder {
                        holder_id: h.holder_id,
                        session_id: h.session_id,
                        description: h.description,
                        acquired_at: h.acquired_at,
                    })
                    .collect()
            })
            .map_err(|e| AmuxError::External(e.into()))
    }

    /// Runs hooks for `event`, logging but never propagating failure —
    /// `workspace_remove` must run best-effort even if the worktree is
    /// already gone.
    async fn run_hooks_best_effort(&self, event: HookEvent, working_dir: &Path, context: &HookContext) -> Vec<HookResult> {
        match self.hooks.run_event(event, working_dir, context).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(%event, error = %e, "hook run failed");
                Vec::new()
            }
        }
    }
}

/// Collapses `name` to `[A-Za-z0-9-]`, trims repeated hyphens, truncates to
/// `max_len` without cutting mid-hyphen.
fn slugify(name: &str, max_len: usize) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '-',
        })
        .collect();
    let collapsed = sanitized.split('-').filter(|s| !s.is_empty()).collect::<Vec<_>>().join("-").to_lowercase();
    if collapsed.is_empty() {
        return "workspace".to_string();
    }
    if collapsed.len() <= max_len {
        collapsed
    } else {
        collapsed[..max_len].trim_end_matches('-').to_string()
    }
}

fn short_random_hex(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len).map(|_| format!("{:x}", rng.random::<u8>() % 16)).collect()
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
