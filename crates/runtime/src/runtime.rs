// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime contract: the backend that starts, finds, and
//! lists `Process` instances. Two implementations ship in this crate —
//! `DirectExecRuntime` and `MultiplexerRuntime` — selected per agent config
//! by `RuntimeKind`.

use crate::process::{ExecutionSpec, Process, ProcessError};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait Runtime: Send + Sync {
    /// Human-readable name used in `RuntimeNotAvailable` error messages.
    fn name(&self) -> &'static str;

    /// Checks whether this backend's external dependency (the multiplexer
    /// binary, for instance) is actually usable on this host. The session
    /// manager calls this before any side effect.
    async fn validate(&self) -> bool;

    async fn start(&self, session_id: &str, spec: ExecutionSpec) -> Result<Arc<dyn Process>, ProcessError>;

    async fn find(&self, session_id: &str) -> Result<Arc<dyn Process>, ProcessError>;

    async fn list(&self) -> Result<Vec<String>, ProcessError>;

    async fn stop(&self, session_id: &str) -> Result<(), ProcessError> {
        self.find(session_id).await?.stop().await
    }

    async fn kill(&self, session_id: &str) -> Result<(), ProcessError> {
        self.find(session_id).await?.kill().await
    }

    async fn send_input(&self, session_id: &str, text: &str) -> Result<(), ProcessError> {
        self.find(session_id).await?.send_input(text).await
    }
}
