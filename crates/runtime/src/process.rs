// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Uniform process contract: whatever actually supervises a
//! session's child, in-process state machine or tmux pane, is addressed
//! through this trait so the session manager never branches on backend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Grace period between a graceful stop signal and an escalation to kill.
pub const GRACEFUL_STOP_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("process not found: {0}")]
    NotFound(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
    #[error("input is not supported on this backend")]
    InputUnsupported,
    #[error("timed out waiting for process")]
    Timeout,
}

/// What to run and how, independent of the backend that will run it.
#[derive(Debug, Clone)]
pub struct ExecutionSpec {
    pub argv: Vec<String>,
    pub env: HashMap<String, String>,
    pub working_dir: PathBuf,
    /// Backend-specific knobs (e.g. tmux styling), opaque to the session manager.
    pub runtime_options: serde_json::Value,
    /// Text injected into the process's input stream immediately after start.
    pub initial_input: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Starting,
    Running,
    Stopped,
    Failed,
}

/// Backend-specific identifying details surfaced for diagnostics, never
/// interpreted by the session manager itself.
#[derive(Debug, Clone, Default)]
pub struct ProcessMetadata {
    pub pid: Option<u32>,
    pub pgid: Option<u32>,
    pub multiplexer_session_name: Option<String>,
}

#[async_trait]
pub trait Process: Send + Sync {
    fn id(&self) -> &str;

    async fn state(&self) -> Result<ProcessState, ProcessError>;

    /// Blocks until the process exits.
    async fn wait(&self) -> Result<(), ProcessError>;

    /// Requests graceful termination, escalating to `kill` after
    /// `GRACEFUL_STOP_WINDOW` if the process hasn't exited.
    async fn stop(&self) -> Result<(), ProcessError>;

    /// Terminates the process immediately.
    async fn kill(&self) -> Result<(), ProcessError>;

    /// Captures recently produced output, if this backend captures any.
    async fn output(&self, lines: u32) -> Result<Option<String>, ProcessError>;

    /// Valid once `wait` has returned or `state` reports stopped/failed.
    async fn exit_code(&self) -> Result<Option<i32>, ProcessError>;

    fn start_time(&self) -> u64;

    /// Returns `ProcessError::InputUnsupported` on backends that can't.
    async fn send_input(&self, text: &str) -> Result<(), ProcessError>;

    fn metadata(&self) -> ProcessMetadata;
}

impl std::fmt::Debug for dyn Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Process").field("id", &self.id()).finish()
    }
}
