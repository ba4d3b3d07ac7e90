// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal-multiplexer adapter contract.

use crate::process::ProcessError;
use async_trait::async_trait;
use std::path::Path;

/// Everything a `MultiplexerRuntime` needs from the external multiplexer
/// binary. A mock implementation with identical semantics must be
/// providable for tests — see `FakeMultiplexerAdapter` below.
#[async_trait]
pub trait MultiplexerAdapter: Send + Sync + 'static {
    async fn is_available(&self) -> bool;

    async fn create_session(
        &self,
        name: &str,
        work_dir: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<(), ProcessError>;

    async fn session_exists(&self, name: &str) -> Result<bool, ProcessError>;

    async fn kill_session(&self, name: &str) -> Result<(), ProcessError>;

    async fn send_keys(&self, name: &str, keys: &str) -> Result<(), ProcessError>;

    async fn send_literal(&self, name: &str, text: &str) -> Result<(), ProcessError>;

    async fn capture_pane(&self, name: &str, lines: u32) -> Result<String, ProcessError>;

    async fn list_sessions(&self) -> Result<Vec<String>, ProcessError>;

    async fn get_session_pid(&self, name: &str) -> Result<Option<u32>, ProcessError>;

    async fn set_environment(&self, name: &str, env: &[(String, String)]) -> Result<(), ProcessError>;

    async fn resize_window(&self, name: &str, width: u32, height: u32) -> Result<(), ProcessError>;

    /// Queries whether the pane's process has exited, returning its exit
    /// code if so, `None` if it's still running.
    async fn is_pane_dead(&self, name: &str) -> Result<Option<i32>, ProcessError>;
}

mod tmux;
pub use tmux::TmuxMultiplexerAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeMultiplexerAdapter;
