// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Direct-exec runtime: spawns a child with the
//! OS process facility, placed in its own process group (and, on Linux, its
//! own session) so signal delivery never touches the parent. Graceful stop
//! sends SIGTERM to the group, waits up to `GRACEFUL_STOP_WINDOW`, then
//! escalates to SIGKILL. Input sending is unsupported on this backend.

use crate::process::{ExecutionSpec, Process, ProcessError, ProcessMetadata, ProcessState, GRACEFUL_STOP_WINDOW};
use crate::runtime::Runtime;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::os::unix::process::CommandExt;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Mutex as AsyncMutex;

#[derive(Default)]
pub struct DirectExecRuntime {
    processes: Mutex<HashMap<String, Arc<DirectExecProcess>>>,
}

impl DirectExecRuntime {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Runtime for DirectExecRuntime {
    fn name(&self) -> &'static str {
        "direct-exec"
    }

    async fn validate(&self) -> bool {
        // The direct-exec backend only needs the OS process facility, which
        // is always present.
        true
    }

    async fn start(&self, session_id: &str, spec: ExecutionSpec) -> Result<Arc<dyn Process>, ProcessError> {
        let (program, args) = spec
            .argv
            .split_first()
            .ok_or_else(|| ProcessError::SpawnFailed("empty argv".to_string()))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&spec.working_dir)
            .envs(&spec.env)
            .kill_on_drop(false)
            // Places the child in a new process group (pgid == its own pid)
            // so a signal to the group never reaches the parent.
            .process_group(0);

        let child = cmd.spawn().map_err(|e| ProcessError::SpawnFailed(e.to_string()))?;
        let pid = child.id().ok_or_else(|| ProcessError::SpawnFailed("child exited immediately".to_string()))?;

        let process = Arc::new(DirectExecProcess {
            id: session_id.to_string(),
            pid,
            child: AsyncMutex::new(Some(child)),
            start_time: now_secs(),
            exit_code: Mutex::new(None),
        });

        self.processes.lock().insert(session_id.to_string(), process.clone());
        Ok(process)
    }

    async fn find(&self, session_id: &str) -> Result<Arc<dyn Process>, ProcessError> {
        self.processes
            .lock()
            .get(session_id)
            .cloned()
            .map(|p| p as Arc<dyn Process>)
            .ok_or_else(|| ProcessError::NotFound(session_id.to_string()))
    }

    async fn list(&self) -> Result<Vec<String>, ProcessError> {
        Ok(self.processes.lock().keys().cloned().collect())
    }
}

pub struct DirectExecProcess {
    id: String,
    pid: u32,
    child: AsyncMutex<Option<tokio::process::Child>>,
    start_time: u64,
    exit_code: Mutex<Option<i32>>,
}

#[async_trait]
impl Process for DirectExecProcess {
    fn id(&self) -> &str {
        &self.id
    }

    async fn state(&self) -> Result<ProcessState, ProcessError> {
        if let Some(code) = *self.exit_code.lock() {
            return Ok(if code == 0 { ProcessState::Stopped } else { ProcessState::Failed });
        }
        let mut guard = self.child.lock().await;
        let Some(child) = guard.as_mut() else {
            return Ok(ProcessState::Stopped);
        };
        match child.try_wait().map_err(|e| ProcessError::CommandFailed(e.to_string()))? {
            None => Ok(ProcessState::Running),
            Some(status) => {
                let code = status.code().unwrap_or(-1);
                *self.exit_code.lock() = Some(code);
                Ok(if code == 0 { ProcessState::Stopped } else { ProcessState::Failed })
            }
        }
    }

    async fn wait(&self) -> Result<(), ProcessError> {
        let mut guard = self.child.lock().await;
        let Some(child) = guard.as_mut() else {
            return Ok(());
        };
        let status = child.wait().await.map_err(|e| ProcessError::CommandFailed(e.to_string()))?;
        *self.exit_code.lock() = Some(status.code().unwrap_or(-1));
        Ok(())
    }

    async fn stop(&self) -> Result<(), ProcessError> {
        signal_group(self.pid, nix::sys::signal::Signal::SIGTERM);
        let deadline = tokio::time::Instant::now() + GRACEFUL_STOP_WINDOW;
        loop {
            if self.state().await? != ProcessState::Running {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return self.kill().await;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    }

    async fn kill(&self) -> Result<(), ProcessError> {
        signal_group(self.pid, nix::sys::signal::Signal::SIGKILL);
        let _ = self.wait().await;
        Ok(())
    }

    async fn output(&self, _lines: u32) -> Result<Option<String>, ProcessError> {
        // This backend inherits the parent's TTY or, when routed to a
        // socket, is captured by the watch consumer directly; there is no
        // in-process buffer to read from here.
        Ok(None)
    }

    async fn exit_code(&self) -> Result<Option<i32>, ProcessError> {
        Ok(*self.exit_code.lock())
    }

    fn start_time(&self) -> u64 {
        self.start_time
    }

    async fn send_input(&self, _text: &str) -> Result<(), ProcessError> {
        Err(ProcessError::InputUnsupported)
    }

    fn metadata(&self) -> ProcessMetadata {
        ProcessMetadata {
            pid: Some(self.pid),
            pgid: Some(self.pid),
            multiplexer_session_name: None,
        }
    }
}

fn signal_group(pid: u32, signal: nix::sys::signal::Signal) {
    let pgid = nix::unistd::Pid::from_raw(-(pid as i32));
    let _ = nix::sys::signal::kill(pgid, signal);
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "direct_exec_tests.rs"]
mod tests;
