// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Holder semaphore for a workspace:
//! `semaphore.yaml` records who currently holds a workspace, read/written
//! via the File Manager's CAS update so concurrent acquirers don't clobber
//! each other.

use amux_core::{HolderId, SessionId};
use amux_storage::{FileManager, UpdateError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SemaphoreError {
    #[error("workspace is already at capacity ({0})")]
    NoCapacity(u32),
    #[error("holder {0} already holds this workspace")]
    AlreadyHeld(String),
    #[error(transparent)]
    Storage(#[from] amux_storage::FileManagerError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolderRecord {
    pub holder_id: HolderId,
    pub session_id: Option<SessionId>,
    pub description: String,
    pub acquired_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemaphoreState {
    pub capacity: u32,
    pub holders: Vec<HolderRecord>,
}

impl Default for SemaphoreState {
    fn default() -> Self {
        Self {
            capacity: 1,
            holders: Vec::new(),
        }
    }
}

pub struct WorkspaceSemaphore {
    path: PathBuf,
    file_manager: FileManager,
}

impl WorkspaceSemaphore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_manager: FileManager::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn acquire(&self, holder_id: &HolderId, session_id: Option<SessionId>, description: &str, now: u64) -> Result<(), SemaphoreError> {
        let result: Result<(), UpdateError<SemaphoreError>> = self.file_manager.update(&self.path, |state: &mut SemaphoreState| {
            if state.holders.iter().any(|h| &h.holder_id == holder_id) {
                return Err(SemaphoreError::AlreadyHeld(holder_id.to_string()));
            }
            if state.holders.len() as u32 >= state.capacity.max(1) {
                return Err(SemaphoreError::NoCapacity(state.capacity));
            }
            state.holders.push(HolderRecord {
                holder_id: holder_id.clone(),
                session_id,
                description: description.to_string(),
                acquired_at: now,
            });
            Ok(())
        });
        match result {
            Ok(()) => Ok(()),
            Err(UpdateError::FileManager(e)) => Err(SemaphoreError::Storage(e)),
            Err(UpdateError::Apply(inner)) => Err(inner),
        }
    }

    pub fn release(&self, holder_id: &HolderId) -> Result<(), SemaphoreError> {
        let result: Result<(), UpdateError<std::convert::Infallible>> = self.file_manager.update(&self.path, |state: &mut SemaphoreState| {
            state.holders.retain(|h| &h.holder_id != holder_id);
            Ok(())
        });
        match result {
            Ok(()) => Ok(()),
            Err(UpdateError::FileManager(e)) => Err(SemaphoreError::Storage(e)),
            Err(UpdateError::Apply(never)) => match never {},
        }
    }

    pub fn holders(&self) -> Result<Vec<HolderRecord>, SemaphoreError> {
        match self.file_manager.read::<SemaphoreState>(&self.path) {
            Ok((state, _)) => Ok(state.holders),
            Err(amux_storage::FileManagerError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(SemaphoreError::Storage(e)),
        }
    }
}

#[cfg(test)]
#[path = "semaphore_tests.rs"]
mod tests;
