// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stable entity identifiers.
//!
//! `WorkspaceId` and `SessionId` are the long, globally-unique identifiers
//! assigned at creation time. Both are paired with a small positive integer
//! "short index" (see `amux_storage::index`) that acts as a human-friendly
//! alias; the long ID remains the ground truth on disk.

crate::define_id! {
    /// Unique identifier for an isolated checkout (one git worktree + storage dir).
    pub struct WorkspaceId;
}

crate::define_id! {
    /// Unique identifier for a supervised session bound to a workspace.
    pub struct SessionId;
}

/// Identifier for an agent catalog entry (config key), e.g. `"claude"`.
///
/// Unlike `WorkspaceId`/`SessionId` this is not generated; it names a static
/// entry in the agent catalog and must match `[A-Za-z0-9_-]+`.
pub type AgentId = String;

/// Identifier for a workspace holder (the session, or other caller, that
/// acquired a slot in a workspace's semaphore).
pub type HolderId = String;

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
