// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tmux implementation of the multiplexer adapter contract.

use super::MultiplexerAdapter;
use crate::process::ProcessError;
use crate::subprocess::{run_with_timeout, TMUX_TIMEOUT};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

#[derive(Clone, Default)]
pub struct TmuxMultiplexerAdapter;

impl TmuxMultiplexerAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MultiplexerAdapter for TmuxMultiplexerAdapter {
    async fn is_available(&self) -> bool {
        let mut cmd = Command::new("tmux");
        cmd.arg("-V");
        matches!(
            run_with_timeout(cmd, TMUX_TIMEOUT, "tmux -V").await,
            Ok(output) if output.status.success()
        )
    }

    async fn create_session(
        &self,
        name: &str,
        work_dir: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<(), ProcessError> {
        if !work_dir.exists() {
            return Err(ProcessError::SpawnFailed(format!(
                "working directory does not exist: {}",
                work_dir.display()
            )));
        }

        if self.session_exists(name).await.unwrap_or(false) {
            tracing::warn!(session = name, "tmux session already exists, killing first");
            let _ = self.kill_session(name).await;
        }

        let mut tmux_cmd = Command::new("tmux");
        tmux_cmd.arg("new-session").arg("-d").arg("-s").arg(name).arg("-c").arg(work_dir);
        for (key, value) in env {
            tmux_cmd.arg("-e").arg(format!("{}={}", key, value));
        }
        tmux_cmd.arg(cmd);

        let output = run_with_timeout(tmux_cmd, TMUX_TIMEOUT, "tmux new-session")
            .await
            .map_err(ProcessError::SpawnFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProcessError::SpawnFailed(stderr.to_string()));
        }
        Ok(())
    }

    async fn session_exists(&self, name: &str) -> Result<bool, ProcessError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["has-session", "-t", name]);
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux has-session")
            .await
            .map_err(ProcessError::CommandFailed)?;
        Ok(output.status.success())
    }

    async fn kill_session(&self, name: &str) -> Result<(), ProcessError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["kill-session", "-t", name]);
        let _ = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux kill-session").await;
        Ok(())
    }

    async fn send_keys(&self, name: &str, keys: &str) -> Result<(), ProcessError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["send-keys", "-t", name, keys]);
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux send-keys")
            .await
            .map_err(ProcessError::CommandFailed)?;
        if !output.status.success() {
            return Err(ProcessError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn send_literal(&self, name: &str, text: &str) -> Result<(), ProcessError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["send-keys", "-t", name, "-l", "--", text]);
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux send-keys -l")
            .await
            .map_err(ProcessError::CommandFailed)?;
        if !output.status.success() {
            return Err(ProcessError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn capture_pane(&self, name: &str, lines: u32) -> Result<String, ProcessError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["capture-pane", "-t", name, "-p", "-S", &format!("-{}", lines)]);
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux capture-pane")
            .await
            .map_err(ProcessError::CommandFailed)?;
        if !output.status.success() {
            return Err(ProcessError::NotFound(name.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn list_sessions(&self) -> Result<Vec<String>, ProcessError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["list-sessions", "-F", "#{session_name}"]);
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux list-sessions").await;
        match output {
            Ok(output) if output.status.success() => Ok(String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::to_string)
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn get_session_pid(&self, name: &str) -> Result<Option<u32>, ProcessError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["list-panes", "-t", name, "-F", "#{pane_pid}"]);
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux list-panes")
            .await
            .map_err(ProcessError::CommandFailed)?;
        if !output.status.success() {
            return Err(ProcessError::NotFound(name.to_string()));
        }
        let pid_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(pid_str.parse::<u32>().ok())
    }

    async fn set_environment(&self, name: &str, env: &[(String, String)]) -> Result<(), ProcessError> {
        for (key, value) in env {
            let mut cmd = Command::new("tmux");
            cmd.args(["set-environment", "-t", name, key, value]);
            let _ = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux set-environment").await;
        }
        Ok(())
    }

    async fn resize_window(&self, name: &str, width: u32, height: u32) -> Result<(), ProcessError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["resize-window", "-t", name, "-x", &width.to_string(), "-y", &height.to_string()]);
        let _ = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux resize-window").await;
        Ok(())
    }

    async fn is_pane_dead(&self, name: &str) -> Result<Option<i32>, ProcessError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["display-message", "-t", name, "-p", "#{pane_dead_status}"]);
        let output = run_with_timeout(cmd, TMUX_TIMEOUT, "tmux display-message")
            .await
            .map_err(ProcessError::CommandFailed)?;
        if !output.status.success() {
            return Err(ProcessError::NotFound(name.to_string()));
        }
        let status_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(status_str.parse::<i32>().ok())
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
