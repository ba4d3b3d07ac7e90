// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Runtime`/`Process` adapted from a `MultiplexerAdapter`.
//!
//! Multiplexer session names are derived as
//! `amux-<workspaceID>-<agentID>-<unix>`.

use crate::multiplexer::MultiplexerAdapter;
use crate::process::{ExecutionSpec, Process, ProcessError, ProcessMetadata, ProcessState};
use crate::runtime::Runtime;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub fn multiplexer_session_name(workspace_id: &str, agent_id: &str, unix_time: u64) -> String {
    format!("amux-{}-{}-{}", workspace_id, agent_id, unix_time)
}

pub struct MultiplexerRuntime<A: MultiplexerAdapter> {
    adapter: Arc<A>,
}

impl<A: MultiplexerAdapter> MultiplexerRuntime<A> {
    pub fn new(adapter: A) -> Self {
        Self { adapter: Arc::new(adapter) }
    }
}

#[async_trait]
impl<A: MultiplexerAdapter> Runtime for MultiplexerRuntime<A> {
    fn name(&self) -> &'static str {
        "terminal-multiplexer"
    }

    async fn validate(&self) -> bool {
        self.adapter.is_available().await
    }

    async fn start(&self, session_id: &str, spec: ExecutionSpec) -> Result<Arc<dyn Process>, ProcessError> {
        let env: Vec<(String, String)> = spec.env.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let cmd = spec.argv.join(" ");
        self.adapter
            .create_session(session_id, &spec.working_dir, &cmd, &env)
            .await?;

        let process = MultiplexerProcess {
            id: session_id.to_string(),
            adapter: self.adapter.clone(),
            start_time: now_secs(),
        };

        if let Some(input) = &spec.initial_input {
            process.send_input(input).await?;
        }

        Ok(Arc::new(process))
    }

    async fn find(&self, session_id: &str) -> Result<Arc<dyn Process>, ProcessError> {
        if !self.adapter.session_exists(session_id).await? {
            return Err(ProcessError::NotFound(session_id.to_string()));
        }
        Ok(Arc::new(MultiplexerProcess {
            id: session_id.to_string(),
            adapter: self.adapter.clone(),
            start_time: now_secs(),
        }))
    }

    async fn list(&self) -> Result<Vec<String>, ProcessError> {
        self.adapter.list_sessions().await
    }
}

struct MultiplexerProcess<A: MultiplexerAdapter> {
    id: String,
    adapter: Arc<A>,
    start_time: u64,
}

#[async_trait]
impl<A: MultiplexerAdapter> Process for MultiplexerProcess<A> {
    fn id(&self) -> &str {
        &self.id
    }

    async fn state(&self) -> Result<ProcessState, ProcessError> {
        match self.adapter.is_pane_dead(&self.id).await? {
            None => Ok(ProcessState::Running),
            Some(0) => Ok(ProcessState::Stopped),
            Some(_) => Ok(ProcessState::Failed),
        }
    }

    async fn wait(&self) -> Result<(), ProcessError> {
        loop {
            if self.adapter.is_pane_dead(&self.id).await?.is_some() {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    async fn stop(&self) -> Result<(), ProcessError> {
        self.adapter.kill_session(&self.id).await
    }

    async fn kill(&self) -> Result<(), ProcessError> {
        self.adapter.kill_session(&self.id).await
    }

    async fn output(&self, lines: u32) -> Result<Option<String>, ProcessError> {
        Ok(Some(self.adapter.capture_pane(&self.id, lines).await?))
    }

    async fn exit_code(&self) -> Result<Option<i32>, ProcessError> {
        self.adapter.is_pane_dead(&self.id).await
    }

    fn start_time(&self) -> u64 {
        self.start_time
    }

    async fn send_input(&self, text: &str) -> Result<(), ProcessError> {
        self.adapter.send_literal(&self.id, text).await?;
        self.adapter.send_keys(&self.id, "Enter").await
    }

    fn metadata(&self) -> ProcessMetadata {
        ProcessMetadata {
            pid: None,
            pgid: None,
            multiplexer_session_name: Some(self.id.clone()),
        }
    }
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "multiplexer_runtime_tests.rs"]
mod tests;
