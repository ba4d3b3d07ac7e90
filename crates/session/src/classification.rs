// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Working/idle classification: reconciles recorded
//! session status with the backend's actual liveness, distinguishing a
//! dead multiplexer session from a completed foreground command from mere
//! inactivity.

use amux_core::session::SessionStatus;
use amux_runtime::{MultiplexerAdapter, Process, ProcessChecker, ProcessState};
use std::time::Duration;

/// Fixed idle threshold: no output change for this long while `working`
/// transitions to `idle`.
const IDLE_THRESHOLD_SECS: u64 = 3;
const ECHO_SETTLE: Duration = Duration::from_millis(100);
const OUTPUT_TAIL_LINES: u32 = 20;
const EXIT_PROBE_LINES: u32 = 5;

/// What a classification pass found, to be merged into the persisted
/// session record by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: SessionStatus,
    pub error: Option<String>,
    pub exit_code: Option<i32>,
    pub last_output_hash: Option<u32>,
    pub last_output_time: Option<u64>,
}

impl StatusUpdate {
    fn terminal(status: SessionStatus, error: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            status,
            error: Some(error.into()),
            exit_code,
            last_output_hash: None,
            last_output_time: None,
        }
    }
}

/// Backend-specific handle a classification pass needs. Direct-exec
/// sessions have no shell-prompt concept to poll, so their classification
/// is a straight read of process exit state.
pub enum RuntimeHandle<'a> {
    Multiplexer {
        adapter: &'a dyn MultiplexerAdapter,
        session_name: &'a str,
    },
    DirectExec {
        process: &'a dyn Process,
    },
}

/// Runs one `UpdateStatus` pass. Returns `None` if nothing changed (no
/// write should be persisted).
pub async fn classify(
    current_status: SessionStatus,
    last_output_hash: u32,
    last_output_time: u64,
    now: u64,
    handle: RuntimeHandle<'_>,
    checker: &dyn ProcessChecker,
) -> Option<StatusUpdate> {
    if current_status.is_terminal() || current_status == SessionStatus::Orphaned {
        return None;
    }

    match handle {
        RuntimeHandle::Multiplexer { adapter, session_name } => {
            classify_multiplexer(current_status, last_output_hash, last_output_time, now, adapter, session_name, checker).await
        }
        RuntimeHandle::DirectExec { process } => classify_direct_exec(current_status, process, checker).await,
    }
}

async fn classify_multiplexer(
    current_status: SessionStatus,
    last_output_hash: u32,
    last_output_time: u64,
    now: u64,
    adapter: &dyn MultiplexerAdapter,
    session_name: &str,
    checker: &dyn ProcessChecker,
) -> Option<StatusUpdate> {
    if !adapter.session_exists(session_name).await.unwrap_or(false) {
        return Some(StatusUpdate::terminal(SessionStatus::Failed, "underlying session no longer exists", None));
    }

    if let Ok(Some(code)) = adapter.is_pane_dead(session_name).await {
        return Some(StatusUpdate::terminal(SessionStatus::Failed, "shell exited", Some(code)));
    }

    if let Ok(Some(pid)) = adapter.get_session_pid(session_name).await {
        if let Ok(false) = checker.has_children(pid).await {
            if let Some(update) = probe_exit_status(adapter, session_name).await {
                return Some(update);
            }
        }
    }

    let captured = adapter.capture_pane(session_name, OUTPUT_TAIL_LINES).await.unwrap_or_default();
    let hash = fnv1a32(captured.as_bytes());

    if hash != last_output_hash {
        return Some(StatusUpdate {
            status: SessionStatus::Working,
            error: None,
            exit_code: None,
            last_output_hash: Some(hash),
            last_output_time: Some(now),
        });
    }

    if current_status == SessionStatus::Working && now.saturating_sub(last_output_time) >= IDLE_THRESHOLD_SECS {
        return Some(StatusUpdate {
            status: SessionStatus::Idle,
            error: None,
            exit_code: None,
            last_output_hash: None,
            last_output_time: None,
        });
    }

    None
}

/// The PID has no children: the wrapped shell is back at its prompt. Send
/// `echo $?`, give it a moment to print, and parse the trailing integer
/// from the last few lines.
async fn probe_exit_status(adapter: &dyn MultiplexerAdapter, session_name: &str) -> Option<StatusUpdate> {
    adapter.send_literal(session_name, "echo $?").await.ok()?;
    adapter.send_keys(session_name, "Enter").await.ok()?;
    tokio::time::sleep(ECHO_SETTLE).await;
    let captured = adapter.capture_pane(session_name, EXIT_PROBE_LINES).await.ok()?;
    let code = parse_trailing_int(&captured)?;
    if code == 0 {
        Some(StatusUpdate {
            status: SessionStatus::Completed,
            error: None,
            exit_code: Some(code),
            last_output_hash: None,
            last_output_time: None,
        })
    } else {
        Some(StatusUpdate::terminal(SessionStatus::Failed, format!("command exited with code {code}"), Some(code)))
    }
}

async fn classify_direct_exec(current_status: SessionStatus, process: &dyn Process, _checker: &dyn ProcessChecker) -> Option<StatusUpdate> {
    let state = process.state().await.ok()?;
    let new_status = match state {
        ProcessState::Starting | ProcessState::Running => {
            if current_status == SessionStatus::Working {
                return None;
            }
            SessionStatus::Working
        }
        ProcessState::Stopped => SessionStatus::Completed,
        ProcessState::Failed => SessionStatus::Failed,
    };

    if new_status == current_status {
        return None;
    }

    let exit_code = process.exit_code().await.ok().flatten();
    let error = match new_status {
        SessionStatus::Failed => Some(format!("command exited with code {}", exit_code.unwrap_or(-1))),
        _ => None,
    };

    Some(StatusUpdate {
        status: new_status,
        error,
        exit_code,
        last_output_hash: None,
        last_output_time: None,
    })
}

/// Parses the last line in `text` that is a bare integer, as printed by
/// `echo $?`.
fn parse_trailing_int(text: &str) -> Option<i32> {
    text.lines().rev().find_map(|line| line.trim().parse::<i32>().ok())
}

/// 32-bit FNV-1a over `data`, used to detect pane output changes cheaply
///.
pub fn fnv1a32(data: &[u8]) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    data.iter().fold(OFFSET_BASIS, |hash, &byte| (hash ^ byte as u32).wrapping_mul(PRIME))
}

#[cfg(test)]
#[path = "classification_tests.rs"]
mod tests;
