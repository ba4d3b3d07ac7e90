// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hook executor: resolves each hook's
//! command, merges environment host < base < hook, spawns `sh -c`, and
//! applies the hook's `on_error` policy.

use amux_core::{Clock, HookSpec, OnError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum HookError {
    #[error("hook '{name}' has neither command nor script")]
    NoCommand { name: String },
    #[error("hook '{name}' failed: {message}")]
    Failed { name: String, message: String },
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HookResult {
    pub name: String,
    pub exit_code: Option<i32>,
    pub output: String,
    pub error: Option<String>,
    pub started_at: u64,
    pub ended_at: u64,
}

/// Resolves and runs a single event's hooks in config order.
pub struct HookExecutor {
    config_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl HookExecutor {
    pub fn new(config_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config_dir: config_dir.into(),
            clock,
        }
    }

    fn resolve_command(&self, hook: &HookSpec) -> Result<String, HookError> {
        if let Some(command) = &hook.command {
            return Ok(command.clone());
        }
        if let Some(script) = &hook.script {
            let resolved = if script.is_absolute() {
                script.clone()
            } else {
                self.config_dir.join(script)
            };
            return Ok(resolved.display().to_string());
        }
        Err(HookError::NoCommand { name: hook.name.clone() })
    }

    /// Runs `hooks` in order inside `working_dir`, merging `base_env` over
    /// the host environment and each hook's own `env` over that. Stops and
    /// returns `Err` on the first hook whose `on_error` is `fail`;
    /// otherwise always returns `Ok` with every hook's result recorded.
    pub async fn run(
        &self,
        hooks: &[HookSpec],
        working_dir: &Path,
        base_env: &HashMap<String, String>,
    ) -> Result<Vec<HookResult>, HookError> {
        let mut results = Vec::with_capacity(hooks.len());
        for hook in hooks {
            let command = self.resolve_command(hook)?;
            let timeout = hook
                .timeout
                .max(Duration::from_millis(1))
                .min(Duration::from_secs(3600));
            let timeout = if timeout == Duration::default() { DEFAULT_TIMEOUT } else { timeout };

            let started_at = self.clock.now_secs();
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&command).current_dir(working_dir);
            for (key, value) in base_env {
                cmd.env(key, value);
            }
            for (key, value) in &hook.env {
                cmd.env(key, value);
            }

            let outcome = tokio::time::timeout(timeout, cmd.output()).await;
            let ended_at = self.clock.now_secs();

            let (exit_code, output, error) = match outcome {
                Ok(Ok(output)) => (
                    output.status.code(),
                    format!(
                        "{}{}",
                        String::from_utf8_lossy(&output.stdout),
                        String::from_utf8_lossy(&output.stderr)
                    ),
                    if output.status.success() { None } else { Some(format!("exit status {:?}", output.status.code())) },
                ),
                Ok(Err(e)) => (None, String::new(), Some(e.to_string())),
                Err(_) => (None, String::new(), Some("timed out".to_string())),
            };

            let failed = error.is_some();
            results.push(HookResult {
                name: hook.name.clone(),
                exit_code,
                output,
                error: error.clone(),
                started_at,
                ended_at,
            });

            if failed {
                match hook.on_error {
                    OnError::Fail => {
                        return Err(HookError::Failed {
                            name: hook.name.clone(),
                            message: error.unwrap_or_default(),
                        })
                    }
                    OnError::Warn => {
                        tracing::warn!(hook = hook.name.as_str(), error = error.as_deref().unwrap_or(""), "hook failed, continuing");
                    }
                    OnError::Ignore => {}
                }
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
