// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child-process liveness check used by the working/idle classifier: a
//! direct-exec or pane PID with no children means the wrapped shell is
//! sitting back at its prompt.

use crate::process::ProcessError;
use crate::subprocess::{run_with_timeout, PROCESS_CHECK_TIMEOUT};
use async_trait::async_trait;
use tokio::process::Command;

#[async_trait]
pub trait ProcessChecker: Send + Sync + 'static {
    /// Whether `pid` currently has any child processes.
    async fn has_children(&self, pid: u32) -> Result<bool, ProcessError>;
}

#[derive(Clone, Default)]
pub struct RealProcessChecker;

impl RealProcessChecker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessChecker for RealProcessChecker {
    async fn has_children(&self, pid: u32) -> Result<bool, ProcessError> {
        let mut cmd = Command::new("pgrep");
        cmd.args(["-P", &pid.to_string()]);
        let output = run_with_timeout(cmd, PROCESS_CHECK_TIMEOUT, "pgrep -P")
            .await
            .map_err(ProcessError::CommandFailed)?;
        // pgrep exits 0 with matches on stdout, 1 with none.
        Ok(output.status.success() && !output.stdout.is_empty())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeProcessChecker {
        with_children: Arc<Mutex<HashSet<u32>>>,
    }

    impl FakeProcessChecker {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_has_children(&self, pid: u32, has_children: bool) {
            let mut set = self.with_children.lock();
            if has_children {
                set.insert(pid);
            } else {
                set.remove(&pid);
            }
        }
    }

    #[async_trait]
    impl ProcessChecker for FakeProcessChecker {
        async fn has_children(&self, pid: u32) -> Result<bool, ProcessError> {
            Ok(self.with_children.lock().contains(&pid))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProcessChecker;

#[cfg(test)]
#[path = "process_checker_tests.rs"]
mod tests;
