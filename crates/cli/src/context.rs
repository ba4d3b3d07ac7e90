// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composition root: wires the workspace, session, mailbox, and hook managers from an on-disk project root
//!. Both the direct CLI command handlers and
//! the `amux mcp` subcommand build one of these and share it.

use amux_core::{Config, SystemClock, UuidIdGen};
use amux_hooks::HookEngine;
use amux_mailbox::MailboxManager;
use amux_runtime::{DirectExecRuntime, MultiplexerRuntime, RealProcessChecker, TmuxMultiplexerAdapter};
use amux_session::SessionManager;
use amux_storage::IndexAllocator;
use amux_workspace::{RealGitCapability, WorkspaceManager};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct AppContext {
    pub project_root: PathBuf,
    pub amux_dir: PathBuf,
    pub config: Arc<Config>,
    pub hooks: Arc<HookEngine>,
    pub workspaces: Arc<WorkspaceManager>,
    pub sessions: Arc<SessionManager>,
    pub mailbox: Arc<MailboxManager>,
}

impl AppContext {
    /// Loads `.amux/config.yaml` under `project_root` and wires every
    /// manager over it. `project_root` must already exist.
    pub fn load(project_root: &Path) -> anyhow::Result<Self> {
        let project_root = project_root.canonicalize()?;
        let amux_dir = project_root.join(".amux");
        let config_path = amux_dir.join("config.yaml");
        let config = Arc::new(amux_config::load(&config_path)?);

        let clock: Arc<dyn amux_core::Clock> = Arc::new(SystemClock);
        let hooks = Arc::new(HookEngine::new(&amux_dir, clock.clone()));
        let index = Arc::new(IndexAllocator::new(amux_dir.join("index.state.yaml")));
        let git: Arc<dyn amux_workspace::GitCapability> = Arc::new(RealGitCapability::new());

        let workspaces = Arc::new(WorkspaceManager::new(
            &amux_dir,
            git,
            hooks.clone(),
            index.clone(),
            clock.clone(),
        ));

        let multiplexer_adapter: Arc<dyn amux_runtime::MultiplexerAdapter> = Arc::new(TmuxMultiplexerAdapter::new());
        let multiplexer_runtime: Arc<dyn amux_runtime::Runtime> = Arc::new(MultiplexerRuntime::new(TmuxMultiplexerAdapter::new()));
        let direct_exec_runtime: Arc<dyn amux_runtime::Runtime> = Arc::new(DirectExecRuntime::new());
        let process_checker: Arc<dyn amux_runtime::ProcessChecker> = Arc::new(RealProcessChecker::new());
        let id_gen: Arc<dyn amux_core::IdGen> = Arc::new(UuidIdGen);

        let sessions = Arc::new(SessionManager::new(
            &amux_dir,
            workspaces.clone(),
            hooks.clone(),
            index,
            clock.clone(),
            id_gen,
            multiplexer_adapter,
            multiplexer_runtime,
            direct_exec_runtime,
            process_checker,
        ));

        let mailbox = Arc::new(MailboxManager::new(&amux_dir, clock));

        Ok(Self {
            project_root,
            amux_dir,
            config,
            hooks,
            workspaces,
            sessions,
            mailbox,
        })
    }
}
