// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level hook engine: loads `hooks.yaml`, gates execution
//! on trust, and injects the standard `AMUX_*` environment before delegating
//! to the executor.

use crate::executor::{HookError, HookExecutor, HookResult};
use crate::trust::{hash_hook_config, TrustStore};
use amux_core::{Clock, HookConfig, HookEvent};
use amux_storage::{FileManager, FileManagerError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Storage(#[from] FileManagerError),
    #[error(transparent)]
    Hook(#[from] HookError),
}

/// Context passed to `run_event`, used to populate `AMUX_WORKSPACE_*` and
/// `AMUX_SESSION_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct HookContext {
    pub project_root: PathBuf,
    pub workspace_id: Option<String>,
    pub workspace_name: Option<String>,
    pub workspace_path: Option<PathBuf>,
    pub workspace_branch: Option<String>,
    pub workspace_base_branch: Option<String>,
    pub session_id: Option<String>,
    pub session_index: Option<u32>,
    pub session_agent_id: Option<String>,
    pub session_name: Option<String>,
    pub session_description: Option<String>,
    pub session_command: Option<String>,
}

impl HookContext {
    /// Builds the standard `AMUX_*` environment for `event`.
    pub fn env(&self, event: HookEvent, now: u64) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("AMUX_EVENT".to_string(), event.to_string());
        env.insert("AMUX_EVENT_TIME".to_string(), now.to_string());
        env.insert("AMUX_PROJECT_ROOT".to_string(), self.project_root.display().to_string());

        if let Some(v) = &self.workspace_id {
            env.insert("AMUX_WORKSPACE_ID".to_string(), v.clone());
        }
        if let Some(v) = &self.workspace_name {
            env.insert("AMUX_WORKSPACE_NAME".to_string(), v.clone());
        }
        if let Some(v) = &self.workspace_path {
            env.insert("AMUX_WORKSPACE_PATH".to_string(), v.display().to_string());
        }
        if let Some(v) = &self.workspace_branch {
            env.insert("AMUX_WORKSPACE_BRANCH".to_string(), v.clone());
        }
        if let Some(v) = &self.workspace_base_branch {
            env.insert("AMUX_WORKSPACE_BASE_BRANCH".to_string(), v.clone());
        }
        if let Some(v) = &self.session_id {
            env.insert("AMUX_SESSION_ID".to_string(), v.clone());
        }
        if let Some(v) = self.session_index {
            env.insert("AMUX_SESSION_INDEX".to_string(), v.to_string());
        }
        if let Some(v) = &self.session_agent_id {
            env.insert("AMUX_SESSION_AGENT_ID".to_string(), v.clone());
        }
        if let Some(v) = &self.session_name {
            env.insert("AMUX_SESSION_NAME".to_string(), v.clone());
        }
        if let Some(v) = &self.session_description {
            env.insert("AMUX_SESSION_DESCRIPTION".to_string(), v.clone());
        }
        if let Some(v) = &self.session_command {
            env.insert("AMUX_SESSION_COMMAND".to_string(), v.clone());
        }
        env
    }
}

pub struct HookEngine {
    config_path: PathBuf,
    config_dir: PathBuf,
    trust_store: TrustStore,
    file_manager: FileManager,
    clock: Arc<dyn Clock>,
}

impl HookEngine {
    pub fn new(config_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        let config_dir = config_dir.into();
        Self {
            config_path: config_dir.join("hooks.yaml"),
            trust_store: TrustStore::new(config_dir.join(".hooks-trust.yaml")),
            config_dir,
            file_manager: FileManager::default(),
            clock,
        }
    }

    pub fn trust_store(&self) -> &TrustStore {
        &self.trust_store
    }

    /// Loads `hooks.yaml`. Per-hook `timeout`/`on_error` defaults are applied
    /// by `HookSpec`'s own deserializer; a missing file is an empty config,
    /// not an error.
    pub fn load_config(&self) -> Result<HookConfig, EngineError> {
        match self.file_manager.read::<HookConfig>(&self.config_path) {
            Ok((config, _)) => Ok(config),
            Err(FileManagerError::NotFound(_)) => Ok(HookConfig::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn hooks_for_event(&self, config: &HookConfig, event: HookEvent) -> Vec<amux_core::HookSpec> {
        config.get(&event).cloned().unwrap_or_default()
    }

    /// Runs every hook registered for `event` in `working_dir`, gated on
    /// trust: an untrusted config is silently skipped.
    pub async fn run_event(&self, event: HookEvent, working_dir: &Path, context: &HookContext) -> Result<Vec<HookResult>, EngineError> {
        let config = self.load_config()?;
        if !self.trust_store.is_trusted(&config) {
            tracing::debug!(%event, "hooks.yaml not trusted, skipping");
            return Ok(Vec::new());
        }

        let hooks = self.hooks_for_event(&config, event);
        if hooks.is_empty() {
            return Ok(Vec::new());
        }

        let now = self.clock.now_secs();
        let env = context.env(event, now);
        let executor = HookExecutor::new(&self.config_dir, self.clock.clone());
        Ok(executor.run(&hooks, working_dir, &env).await?)
    }

    /// Runs `hooks` for `event` unconditionally, bypassing the trust gate
    ///.
    pub async fn run_event_ignoring_trust(
        &self,
        event: HookEvent,
        hooks: &[amux_core::HookSpec],
        working_dir: &Path,
        context: &HookContext,
    ) -> Result<Vec<HookResult>, EngineError> {
        let now = self.clock.now_secs();
        let env = context.env(event, now);
        let executor = HookExecutor::new(&self.config_dir, self.clock.clone());
        Ok(executor.run(hooks, working_dir, &env).await?)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
