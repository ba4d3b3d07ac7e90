// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory multiplexer adapter for tests — no `tmux` binary required.

use super::MultiplexerAdapter;
use crate::process::ProcessError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FakeSession {
    pub work_dir: PathBuf,
    pub cmd: String,
    pub env: Vec<(String, String)>,
    pub output: String,
    pub alive: bool,
    pub pane_exit_code: Option<i32>,
    pub pid: Option<u32>,
}

#[derive(Debug, Clone)]
pub enum MultiplexerCall {
    CreateSession { name: String, cmd: String },
    KillSession { name: String },
    SendKeys { name: String, keys: String },
    SendLiteral { name: String, text: String },
}

struct State {
    sessions: HashMap<String, FakeSession>,
    calls: Vec<MultiplexerCall>,
    available: bool,
    next_pid: u32,
}

#[derive(Clone)]
pub struct FakeMultiplexerAdapter {
    inner: Arc<Mutex<State>>,
}

impl Default for FakeMultiplexerAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(State {
                sessions: HashMap::new(),
                calls: Vec::new(),
                available: true,
                next_pid: 1000,
            })),
        }
    }
}

impl FakeMultiplexerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.inner.lock().available = available;
    }

    pub fn calls(&self) -> Vec<MultiplexerCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_output(&self, name: &str, output: impl Into<String>) {
        if let Some(session) = self.inner.lock().sessions.get_mut(name) {
            session.output = output.into();
        }
    }

    pub fn mark_pane_dead(&self, name: &str, exit_code: i32) {
        if let Some(session) = self.inner.lock().sessions.get_mut(name) {
            session.alive = false;
            session.pane_exit_code = Some(exit_code);
        }
    }
}

#[async_trait]
impl MultiplexerAdapter for FakeMultiplexerAdapter {
    async fn is_available(&self) -> bool {
        self.inner.lock().available
    }

    async fn create_session(
        &self,
        name: &str,
        work_dir: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<(), ProcessError> {
        let mut inner = self.inner.lock();
        let pid = inner.next_pid;
        inner.next_pid += 1;
        inner.calls.push(MultiplexerCall::CreateSession {
            name: name.to_string(),
            cmd: cmd.to_string(),
        });
        inner.sessions.insert(
            name.to_string(),
            FakeSession {
                work_dir: work_dir.to_path_buf(),
                cmd: cmd.to_string(),
                env: env.to_vec(),
                output: String::new(),
                alive: true,
                pane_exit_code: None,
                pid: Some(pid),
            },
        );
        Ok(())
    }

    async fn session_exists(&self, name: &str) -> Result<bool, ProcessError> {
        Ok(self.inner.lock().sessions.contains_key(name))
    }

    async fn kill_session(&self, name: &str) -> Result<(), ProcessError> {
        let mut inner = self.inner.lock();
        inner.calls.push(MultiplexerCall::KillSession { name: name.to_string() });
        inner.sessions.remove(name);
        Ok(())
    }

    async fn send_keys(&self, name: &str, keys: &str) -> Result<(), ProcessError> {
        let mut inner = self.inner.lock();
        if !inner.sessions.contains_key(name) {
            return Err(ProcessError::NotFound(name.to_string()));
        }
        inner.calls.push(MultiplexerCall::SendKeys {
            name: name.to_string(),
            keys: keys.to_string(),
        });
        Ok(())
    }

    async fn send_literal(&self, name: &str, text: &str) -> Result<(), ProcessError> {
        let mut inner = self.inner.lock();
        if !inner.sessions.contains_key(name) {
            return Err(ProcessError::NotFound(name.to_string()));
        }
        inner.calls.push(MultiplexerCall::SendLiteral {
            name: name.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn capture_pane(&self, name: &str, _lines: u32) -> Result<String, ProcessError> {
        self.inner
            .lock()
            .sessions
            .get(name)
            .map(|s| s.output.clone())
            .ok_or_else(|| ProcessError::NotFound(name.to_string()))
    }

    async fn list_sessions(&self) -> Result<Vec<String>, ProcessError> {
        Ok(self.inner.lock().sessions.keys().cloned().collect())
    }

    async fn get_session_pid(&self, name: &str) -> Result<Option<u32>, ProcessError> {
        self.inner
            .lock()
            .sessions
            .get(name)
            .map(|s| s.pid)
            .ok_or_else(|| ProcessError::NotFound(name.to_string()))
    }

    async fn set_environment(&self, name: &str, env: &[(String, String)]) -> Result<(), ProcessError> {
        let mut inner = self.inner.lock();
        let session = inner.sessions.get_mut(name).ok_or_else(|| ProcessError::NotFound(name.to_string()))?;
        session.env.extend(env.iter().cloned());
        Ok(())
    }

    async fn resize_window(&self, _name: &str, _width: u32, _height: u32) -> Result<(), ProcessError> {
        Ok(())
    }

    async fn is_pane_dead(&self, name: &str) -> Result<Option<i32>, ProcessError> {
        let inner = self.inner.lock();
        let session = inner.sessions.get(name).ok_or_else(|| ProcessError::NotFound(name.to_string()))?;
        Ok(if session.alive { None } else { Some(session.pane_exit_code.unwrap_or(0)) })
    }
}
