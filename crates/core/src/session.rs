// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session data model and state machine.
//!
//! This module only holds shape and the pure transition graph; the manager
//! that drives transitions, persists them, and runs change handlers lives in
//! `amux-session`.

use crate::ids::{AgentId, SessionId, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Backend a session runs under.
///
/// Serializes using the config-file vocabulary (`runtime: local | tmux`),
/// not the internal variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeKind {
    /// A terminal-multiplexer-backed session (tmux).
    #[serde(rename = "tmux")]
    TerminalMultiplexer,
    /// A directly-exec'd child process.
    #[serde(rename = "local")]
    DirectExec,
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeKind::TerminalMultiplexer => write!(f, "terminal-multiplexer"),
            RuntimeKind::DirectExec => write!(f, "direct-exec"),
        }
    }
}

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Starting,
    Working,
    Idle,
    Stopping,
    Completed,
    Stopped,
    Failed,
    Orphaned,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Created => "created",
            SessionStatus::Starting => "starting",
            SessionStatus::Working => "working",
            SessionStatus::Idle => "idle",
            SessionStatus::Stopping => "stopping",
            SessionStatus::Completed => "completed",
            SessionStatus::Stopped => "stopped",
            SessionStatus::Failed => "failed",
            SessionStatus::Orphaned => "orphaned",
        };
        write!(f, "{s}")
    }
}

impl SessionStatus {
    /// Terminal statuses never transition.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Stopped | SessionStatus::Failed
        )
    }

    /// The session lifecycle's transition graph, as a pure predicate.
    ///
    /// `Orphaned` is reachable from every non-terminal, non-orphaned state
    /// (the workspace can vanish out from under any live session) but is
    /// itself terminal only in the sense that nothing routes *out* of it in
    /// this version — removal is still allowed, it just isn't a status
    /// transition.
    pub fn can_transition_to(self, to: SessionStatus) -> bool {
        use SessionStatus::*;
        if self.is_terminal() || self == Orphaned {
            return false;
        }
        if to == self {
            return false;
        }
        match self {
            Created => matches!(to, Starting | Failed | Orphaned),
            Starting => matches!(to, Working | Failed | Orphaned),
            Working => matches!(to, Idle | Stopping | Completed | Failed | Orphaned),
            Idle => matches!(to, Working | Stopping | Completed | Failed | Orphaned),
            Stopping => matches!(to, Stopped | Failed | Orphaned),
            Completed | Stopped | Failed | Orphaned => false,
        }
    }
}

/// Command a session runs: either a shell string or an argv vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    Shell(String),
    Argv(Vec<String>),
}

impl Command {
    /// Render to a single shell-invocable string.
    pub fn as_shell_string(&self) -> String {
        match self {
            Command::Shell(s) => s.clone(),
            Command::Argv(args) => args.join(" "),
        }
    }
}

/// Mutable status bookkeeping, updated on every `UpdateStatus` pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub status: SessionStatus,
    pub status_changed_at: u64,
    pub last_output_time: u64,
    pub last_output_hash: u32,
}

impl StatusInfo {
    pub fn new(now: u64) -> Self {
        Self {
            status: SessionStatus::Created,
            status_changed_at: now,
            last_output_time: now,
            last_output_hash: 0,
        }
    }
}

/// A session record as persisted in `session.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub short_index: u32,
    pub runtime_kind: RuntimeKind,
    pub workspace_id: WorkspaceId,
    pub agent_id: AgentId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub command: Command,
    pub env: HashMap<String, String>,
    pub initial_prompt: Option<String>,
    pub status: StatusInfo,
    pub pid: Option<u32>,
    pub multiplexer_session_name: Option<String>,
    pub storage_path: PathBuf,
    pub state_dir: PathBuf,
    pub started_at: Option<u64>,
    pub stopped_at: Option<u64>,
    pub exit_code: Option<i32>,
    pub error: Option<String>,
    pub socket_path: Option<PathBuf>,
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
