// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session Manager: starts, supervises, and tears down
//! agent sessions bound to a workspace, backed by either a terminal
//! multiplexer or a direct-exec `Runtime`.

use crate::classification::{classify, RuntimeHandle};
use amux_core::{
    AgentId, AmuxError, Clock, Command, Config, EntityKind, HookEvent, IdGen, Result, RuntimeKind, Session, SessionId, SessionStatus,
    StatusInfo, Workspace,
};
use amux_hooks::{HookContext, HookEngine, HookResult};
use amux_runtime::{ExecutionSpec, MultiplexerAdapter, ProcessChecker, Runtime};
use amux_storage::{FileManager, FileManagerError, IndexAllocator};
use amux_workspace::{CreateOptions as WorkspaceCreateOptions, WorkspaceManager};
use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Delay between starting a session and injecting its initial prompt, to
/// give the wrapped shell/agent time to settle.
const INITIAL_PROMPT_SETTLE: Duration = Duration::from_millis(100);
const BOUNDED_REFRESH_CONCURRENCY: usize = 10;

/// Inputs to `SessionManager::create`.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub agent_id: AgentId,
    /// Workspace identifier (id, short index, or name). `None` auto-creates one.
    pub workspace: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub initial_prompt: Option<String>,
    /// Overrides, merged over the agent's own environment.
    pub env: HashMap<String, String>,
    pub runtime_override: Option<RuntimeKind>,
    pub no_hooks: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StopOptions {
    pub no_hooks: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub workspace: Option<String>,
}

/// Owns the `sessions/` directory: one subdirectory per session holding
/// `session.yaml`, a `storage/` directory, and a `state/` directory used as
/// the session's `AMUX_CONTEXT_PATH`.
pub struct SessionManager {
    state_dir: PathBuf,
    workspaces: Arc<WorkspaceManager>,
    hooks: Arc<HookEngine>,
    index: Arc<IndexAllocator>,
    file_manager: FileManager,
    clock: Arc<dyn Clock>,
    id_gen: Arc<dyn IdGen>,
    multiplexer_adapter: Arc<dyn MultiplexerAdapter>,
    multiplexer_runtime: Arc<dyn Runtime>,
    direct_exec_runtime: Arc<dyn Runtime>,
    process_checker: Arc<dyn ProcessChecker>,
}

impl SessionManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state_dir: impl Into<PathBuf>,
        workspaces: Arc<WorkspaceManager>,
        hooks: Arc<HookEngine>,
        index: Arc<IndexAllocator>,
        clock: Arc<dyn Clock>,
        id_gen: Arc<dyn IdGen>,
        multiplexer_adapter: Arc<dyn MultiplexerAdapter>,
        multiplexer_runtime: Arc<dyn Runtime>,
        direct_exec_runtime: Arc<dyn Runtime>,
        process_checker: Arc<dyn ProcessChecker>,
    ) -> Self {
        Self {
            state_dir: state_dir.into(),
            workspaces,
            hooks,
            index,
            file_manager: FileManager::default(),
            clock,
            id_gen,
            multiplexer_adapter,
            multiplexer_runtime,
            direct_exec_runtime,
            process_checker,
        }
    }

    fn session_dir(&self, id: &SessionId) -> PathBuf {
        self.state_dir.join("sessions").join(id.as_str())
    }

    fn metadata_path(&self, id: &SessionId) -> PathBuf {
        self.session_dir(id).join("session.yaml")
    }

    fn runtime_for(&self, kind: RuntimeKind) -> &Arc<dyn Runtime> {
        match kind {
            RuntimeKind::TerminalMultiplexer => &self.multiplexer_runtime,
            RuntimeKind::DirectExec => &self.direct_exec_runtime,
        }
    }

    fn runtime_session_id(&self, session: &Session) -> String {
        match session.runtime_kind {
            RuntimeKind::TerminalMultiplexer => session.multiplexer_session_name.clone().unwrap_or_else(|| session.id.to_string()),
            RuntimeKind::DirectExec => session.id.to_string(),
        }
    }

    pub async fn create(&self, repo_root: &Path, config: &Config, opts: CreateOptions) -> Result<Session> {
        let agent = config
            .agent(&opts.agent_id)
            .ok_or_else(|| AmuxError::NotFound(format!("agent '{}'", opts.agent_id)))?
            .clone();
        if agent.command.is_empty() {
            return Err(AmuxError::External(anyhow::anyhow!("agent '{}' has no command configured", opts.agent_id)));
        }

        let runtime_kind = opts.runtime_override.unwrap_or(agent.runtime);
        let runtime = self.runtime_for(runtime_kind).clone();
        if !runtime.validate().await {
            return Err(AmuxError::RuntimeNotAvailable(runtime.name().to_string()));
        }

        let id = SessionId::new(self.id_gen.next());

        let workspace = match &opts.workspace {
            Some(identifier) => self.workspaces.resolve(identifier)?,
            None => {
                self.workspaces
                    .create(
                        repo_root,
                        WorkspaceCreateOptions {
                            name: format!("session-{}", id.short(8)),
                            description: format!("Auto-created for session {}", id.short(8)),
                            base_branch: None,
                            auto_created: true,
                        },
                    )
                    .await?
            }
        };

        let now = self.clock.now_secs();
        let dir = self.session_dir(&id);
        let storage_path = dir.join("storage");
        let state_path = dir.join("state");
        tokio::fs::create_dir_all(&storage_path).await.map_err(AmuxError::Io)?;
        tokio::fs::create_dir_all(&state_path).await.map_err(AmuxError::Io)?;

        let short_index = self
            .index
            .acquire(EntityKind::Session, id.as_str())
            .map_err(|e| AmuxError::External(e.into()))?;

        let mut env = agent.environment.clone();
        env.extend(opts.env.clone());
        env.insert("AMUX_WORKSPACE_ID".to_string(), workspace.id.to_string());
        env.insert("AMUX_WORKSPACE_PATH".to_string(), workspace.worktree_path.display().to_string());
        env.insert("AMUX_SESSION_ID".to_string(), id.to_string());
        env.insert("AMUX_AGENT_ID".to_string(), opts.agent_id.clone());
        env.insert("AMUX_CONTEXT_PATH".to_string(), state_path.display().to_string());

        let command = Command::Argv(agent.command.clone());

        let mut session = Session {
            id: id.clone(),
            short_index,
            runtime_kind,
            workspace_id: workspace.id.clone(),
            agent_id: opts.agent_id.clone(),
            name: opts.name.clone(),
            description: opts.description.clone(),
            command: command.clone(),
            env: env.clone(),
            initial_prompt: opts.initial_prompt.clone(),
            status: StatusInfo::new(now),
            pid: None,
            multiplexer_session_name: None,
            storage_path,
            state_dir: state_path,
            started_at: None,
            stopped_at: None,
            exit_code: None,
            error: None,
            socket_path: None,
        };
        self.persist(&session)?;

        self.transition(&mut session, SessionStatus::Starting)?;

        let working_dir = agent
            .working_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| workspace.worktree_path.clone());

        let spec = ExecutionSpec {
            argv: agent.command.clone(),
            env: env.clone(),
            working_dir: working_dir.clone(),
            runtime_options: agent.runtime_options.clone(),
            initial_input: None,
        };

        let multiplexer_name = amux_runtime::multiplexer_session_name(workspace.id.as_str(), &opts.agent_id, now);
        let runtime_session_id = match runtime_kind {
            RuntimeKind::TerminalMultiplexer => multiplexer_name.clone(),
            RuntimeKind::DirectExec => id.to_string(),
        };

        let process = match runtime.start(&runtime_session_id, spec).await {
            Ok(p) => p,
            Err(e) => {
                if runtime_kind == RuntimeKind::TerminalMultiplexer {
                    let _ = self.multiplexer_adapter.kill_session(&multiplexer_name).await;
                }
                session.status.status = SessionStatus::Failed;
                session.status.status_changed_at = now;
                session.error = Some(e.to_string());
                let _ = self.persist(&session);
                return Err(AmuxError::External(e.into()));
            }
        };

        session.started_at = Some(now);
        session.pid = process.metadata().pid;
        if runtime_kind == RuntimeKind::TerminalMultiplexer {
            session.multiplexer_session_name = Some(multiplexer_name);
        }

        self.transition(&mut session, SessionStatus::Working)?;

        if let Some(prompt) = &opts.initial_prompt {
            tokio::time::sleep(INITIAL_PROMPT_SETTLE).await;
            if let Err(e) = process.send_input(prompt).await {
                tracing::warn!(session_id = %id, error = %e, "initial prompt injection failed");
            }
        }

        if !opts.no_hooks {
            let context = self.hook_context(repo_root, &session, Some(&workspace));
            self.hooks
                .run_event(HookEvent::SessionStart, &working_dir, &context)
                .await
                .map_err(|e| AmuxError::External(e.into()))?;
        }

        Ok(session)
    }

    fn persist(&self, session: &Session) -> Result<()> {
        self.file_manager
            .write(&self.metadata_path(&session.id), session)
            .map_err(|e| AmuxError::External(e.into()))
    }

    fn read_metadata(&self, id: &SessionId) -> std::result::Result<Option<Session>, FileManagerError> {
        match self.file_manager.read::<Session>(&self.metadata_path(id)) {
            Ok((session, _)) => Ok(Some(session)),
            Err(FileManagerError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Applies the valid-transition check, persisting the new status on
    /// success.
    fn transition(&self, session: &mut Session, to: SessionStatus) -> Result<()> {
        let from = session.status.status;
        if to == from {
            return Err(AmuxError::AlreadyInState(from.to_string()));
        }
        if !from.can_transition_to(to) {
            return Err(AmuxError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        session.status.status = to;
        session.status.status_changed_at = self.clock.now_secs();
        self.persist(session)
    }

    /// Marks `status` orphaned if its workspace no longer resolves, without
    /// persisting the change — consistency is recomputed on
    /// every read, mirroring `WorkspaceManager::consistency_of`.
    fn apply_orphan_check(&self, mut session: Session) -> Session {
        if !session.status.status.is_terminal()
            && session.status.status != SessionStatus::Orphaned
            && self.workspaces.resolve(session.workspace_id.as_str()).is_err()
        {
            session.status.status = SessionStatus::Orphaned;
            session.error = Some(format!("workspace {} no longer exists", session.workspace_id));
        }
        session
    }

    /// Tries an exact ID, then a short index, then a unique name match
    ///.
    pub fn resolve(&self, identifier: &str) -> Result<Session> {
        if let Some(session) = self
            .read_metadata(&SessionId::new(identifier))
            .map_err(|e| AmuxError::External(e.into()))?
        {
            return Ok(self.apply_orphan_check(session));
        }

        if let Ok(index) = identifier.parse::<u32>() {
            if let Ok(entity_id) = self.index.get_by_index(EntityKind::Session, index) {
                if let Some(session) = self
                    .read_metadata(&SessionId::new(entity_id))
                    .map_err(|e| AmuxError::External(e.into()))?
                {
                    return Ok(self.apply_orphan_check(session));
                }
            }
        }

        let mut by_name = self
            .list(ListOptions::default())?
            .into_iter()
            .filter(|s| s.name.as_deref() == Some(identifier));
        match (by_name.next(), by_name.next()) {
            (Some(s), None) => Ok(s),
            (Some(_), Some(_)) => Err(AmuxError::Ambiguous(identifier.to_string())),
            (None, _) => Err(AmuxError::NotFound(identifier.to_string())),
        }
    }

    /// Enumerates every session under `sessions/`, reconciling the
    /// short-index allocator against the surviving IDs. Orphaned sessions
    /// (workspace gone) are included, never filtered — they remain
    /// removable.
    pub fn list(&self, opts: ListOptions) -> Result<Vec<Session>> {
        let root = self.state_dir.join("sessions");
        let mut out = Vec::new();
        if root.exists() {
            for entry in std::fs::read_dir(&root).map_err(AmuxError::Io)? {
                let entry = entry.map_err(AmuxError::Io)?;
                if !entry.file_type().map_err(AmuxError::Io)?.is_dir() {
                    continue;
                }
                let id = entry.file_name().to_string_lossy().to_string();
                if let Some(session) = self
                    .read_metadata(&SessionId::new(id))
                    .map_err(|e| AmuxError::External(e.into()))?
                {
                    let session = self.apply_orphan_check(session);
                    if let Some(ws) = &opts.workspace {
                        if session.workspace_id.as_str() != ws.as_str() {
                            continue;
                        }
                    }
                    out.push(session);
                }
            }
        }
        out.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

        let live_ids: Vec<String> = out.iter().map(|s| s.id.to_string()).collect();
        let _ = self.index.reconcile(EntityKind::Session, &live_ids);

        Ok(out)
    }

    pub async fn stop(&self, identifier: &str, opts: StopOptions) -> Result<Session> {
        let mut session = self.resolve(identifier)?;
        if !matches!(session.status.status, SessionStatus::Starting | SessionStatus::Working | SessionStatus::Idle) {
            return Err(AmuxError::NotRunning(session.id.to_string()));
        }

        if !opts.no_hooks {
            let workspace = self.workspaces.resolve(session.workspace_id.as_str()).ok();
            let working_dir = workspace.as_ref().map_or_else(|| PathBuf::from("."), |w| w.worktree_path.clone());
            let context = self.hook_context(&working_dir, &session, workspace.as_ref());
            self.run_hooks_best_effort(HookEvent::SessionStop, &working_dir, &context).await;
        }

        self.transition(&mut session, SessionStatus::Stopping)?;

        let runtime_session_id = self.runtime_session_id(&session);
        let stop_result = match session.runtime_kind {
            RuntimeKind::TerminalMultiplexer => self.multiplexer_adapter.kill_session(&runtime_session_id).await,
            RuntimeKind::DirectExec => self.direct_exec_runtime.stop(&runtime_session_id).await,
        };

        let now = self.clock.now_secs();
        session.stopped_at = Some(now);
        match stop_result {
            Ok(()) => {
                self.transition(&mut session, SessionStatus::Stopped)?;
            }
            Err(e) => {
                session.error = Some(e.to_string());
                self.transition(&mut session, SessionStatus::Failed)?;
            }
        }

        Ok(session)
    }

    pub async fn remove(&self, identifier: &str) -> Result<()> {
        let session = self.resolve(identifier)?;
        if matches!(
            session.status.status,
            SessionStatus::Starting | SessionStatus::Working | SessionStatus::Idle | SessionStatus::Stopping
        ) {
            return Err(AmuxError::AlreadyInState(format!("session {} is running", session.id)));
        }

        if let Some(name) = &session.multiplexer_session_name {
            let _ = self.multiplexer_adapter.kill_session(name).await;
        }

        remove_dir_all_with_retries(&self.session_dir(&session.id)).await?;
        let _ = self.index.release(EntityKind::Session, session.short_index);
        Ok(())
    }

    pub async fn send_input(&self, identifier: &str, text: &str) -> Result<()> {
        let session = self.resolve(identifier)?;
        if !matches!(session.status.status, SessionStatus::Working | SessionStatus::Idle) {
            return Err(AmuxError::NotRunning(session.id.to_string()));
        }
        let runtime_session_id = self.runtime_session_id(&session);
        self.runtime_for(session.runtime_kind)
            .send_input(&runtime_session_id, text)
            .await
            .map_err(|e| AmuxError::External(e.into()))
    }

    /// Captured output snapshot: the last
    /// `lines` lines of whatever the backend has buffered.
    pub async fn output(&self, identifier: &str, lines: u32) -> Result<Option<String>> {
        let session = self.resolve(identifier)?;
        let runtime_session_id = self.runtime_session_id(&session);
        self.runtime_for(session.runtime_kind)
            .find(&runtime_session_id)
            .await
            .map_err(|e| AmuxError::External(e.into()))?
            .output(lines)
            .await
            .map_err(|e| AmuxError::External(e.into()))
    }

    /// Reconciles one session's recorded status against its backend
    ///, persisting only if classification found a change.
    pub async fn refresh_status(&self, identifier: &str) -> Result<Session> {
        let mut session = self.resolve(identifier)?;
        self.apply_classification(&mut session).await?;
        Ok(session)
    }

    /// Refreshes every non-terminal session, at most
    /// `BOUNDED_REFRESH_CONCURRENCY` in flight at once.
    pub async fn refresh_all(&self) -> Result<Vec<Session>> {
        let sessions = self.list(ListOptions::default())?;
        let updated = stream::iter(sessions.into_iter().map(|mut session| async move {
            let _ = self.apply_classification(&mut session).await;
            session
        }))
        .buffer_unordered(BOUNDED_REFRESH_CONCURRENCY)
        .collect::<Vec<_>>()
        .await;
        Ok(updated)
    }

    async fn apply_classification(&self, session: &mut Session) -> Result<()> {
        if session.status.status.is_terminal() || session.status.status == SessionStatus::Orphaned {
            return Ok(());
        }
        let now = self.clock.now_secs();

        let update = match session.runtime_kind {
            RuntimeKind::TerminalMultiplexer => {
                let name = self.runtime_session_id(session);
                classify(
                    session.status.status,
                    session.status.last_output_hash,
                    session.status.last_output_time,
                    now,
                    RuntimeHandle::Multiplexer {
                        adapter: self.multiplexer_adapter.as_ref(),
                        session_name: &name,
                    },
                    self.process_checker.as_ref(),
                )
                .await
            }
            RuntimeKind::DirectExec => match self.direct_exec_runtime.find(session.id.as_str()).await {
                Ok(process) => {
                    classify(
                        session.status.status,
                        session.status.last_output_hash,
                        session.status.last_output_time,
                        now,
                        RuntimeHandle::DirectExec { process: process.as_ref() },
                        self.process_checker.as_ref(),
                    )
                    .await
                }
                Err(_) => None,
            },
        };

        let Some(update) = update else {
            return Ok(());
        };

        session.status.status = update.status;
        session.status.status_changed_at = now;
        if let Some(hash) = update.last_output_hash {
            session.status.last_output_hash = hash;
        }
        if let Some(t) = update.last_output_time {
            session.status.last_output_time = t;
        }
        if let Some(code) = update.exit_code {
            session.exit_code = Some(code);
        }
        if update.error.is_some() {
            session.error = update.error;
        }
        if matches!(update.status, SessionStatus::Completed | SessionStatus::Failed) {
            session.stopped_at = Some(now);
        }
        self.persist(session)
    }

    fn hook_context(&self, project_root: &Path, session: &Session, workspace: Option<&Workspace>) -> HookContext {
        HookContext {
            project_root: project_root.to_path_buf(),
            workspace_id: Some(session.workspace_id.to_string()),
            workspace_name: workspace.map(|w| w.name.clone()),
            workspace_path: workspace.map(|w| w.worktree_path.clone()),
            workspace_branch: workspace.map(|w| w.branch.clone()),
            workspace_base_branch: workspace.map(|w| w.base_branch.clone()),
            session_id: Some(session.id.to_string()),
            session_index: Some(session.short_index),
            session_agent_id: Some(session.agent_id.clone()),
            session_name: session.name.clone(),
            session_description: session.description.clone(),
            session_command: Some(session.command.as_shell_string()),
        }
    }

    /// Runs hooks for `event`, logging but never propagating failure —
    /// `session_stop` must run best-effort even if the workspace is already
    /// gone.
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

async fn remove_dir_all_with_retries(path: &Path) -> Result<()> {
    let mut last_err = None;
    for _ in 0..3 {
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                last_err = Some(e);
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }
    match last_err {
        Some(e) => Err(AmuxError::Io(e)),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
