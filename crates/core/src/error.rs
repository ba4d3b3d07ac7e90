// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy.
//!
//! Every manager crate returns `AmuxError` (directly, or wrapped via
//! `#[from]` in a crate-local enum) so the RPC surface can translate a
//! single stable set of error kinds to callers.

use thiserror::Error;

/// Stable error taxonomy shared across every manager.
#[derive(Debug, Error)]
pub enum AmuxError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("ambiguous identifier '{0}': matches multiple entities")]
    Ambiguous(String),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("already in state {0}")]
    AlreadyInState(String),

    #[error("not running: {0}")]
    NotRunning(String),

    #[error("already running: {0}")]
    AlreadyRunning(String),

    #[error("runtime not available: {0}")]
    RuntimeNotAvailable(String),

    #[error("concurrent modification of {0}")]
    ConcurrentModification(String),

    #[error("path traversal: '{0}' escapes its root")]
    PathTraversal(String),

    #[error("hooks are not trusted for this config")]
    TrustRequired,

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("external error: {0}")]
    External(#[from] anyhow::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AmuxError>;
