// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Short-index allocation.
//!
//! Every workspace and session gets a small, human-typeable integer index
//! alongside its long id. Indices are reused lowest-first once released, so
//! a long-lived repo doesn't march towards ever-larger numbers.

use amux_core::index::{EntityKind, IndexState, KindState};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::file_manager::{FileManager, FileManagerError, UpdateError};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("no entity with short index {0}")]
    NotFound(u32),
    #[error("entity {0} has no allocated index")]
    NotAllocated(String),
    #[error(transparent)]
    FileManager(#[from] FileManagerError),
}

/// Persists `index.state.yaml` and serves index <-> entity-id lookups for
/// every `EntityKind`. One instance is shared by the workspace and session
/// managers.
pub struct IndexAllocator {
    state_path: PathBuf,
    file_manager: FileManager,
}

impl IndexAllocator {
    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            file_manager: FileManager::default(),
        }
    }

    fn load(&self) -> Result<IndexState, IndexError> {
        match self.file_manager.read::<IndexState>(&self.state_path) {
            Ok((state, _)) => Ok(state),
            Err(FileManagerError::NotFound(_)) => Ok(IndexState::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Allocates the lowest available index for `entity_id` under `kind`,
    /// reusing a released index before minting a new one.
    pub fn acquire(&self, kind: EntityKind, entity_id: &str) -> Result<u32, IndexError> {
        let result: Result<u32, UpdateError<std::convert::Infallible>> =
            self.file_manager.update(&self.state_path, |state: &mut IndexState| {
                let kind_state = state.kinds.entry(kind).or_default();
                let index = allocate_index(kind_state, entity_id);
                Ok(index)
            });
        match result {
            Ok(index) => Ok(index),
            Err(UpdateError::FileManager(fe)) => Err(IndexError::FileManager(fe)),
            Err(UpdateError::Apply(never)) => match never {},
        }
    }

    /// Frees `index` under `kind` so it can be reused by a future `acquire`.
    pub fn release(&self, kind: EntityKind, index: u32) -> Result<(), IndexError> {
        let result: Result<(), UpdateError<IndexError>> =
            self.file_manager.update(&self.state_path, |state: &mut IndexState| {
                let kind_state = state.kinds.entry(kind).or_default();
                if kind_state.active.remove(&index).is_none() {
                    return Err(IndexError::NotFound(index));
                }
                kind_state.released.insert(index);
                Ok(())
            });
        match result {
            Ok(()) => Ok(()),
            Err(UpdateError::FileManager(fe)) => Err(IndexError::FileManager(fe)),
            Err(UpdateError::Apply(inner)) => Err(inner),
        }
    }

    /// Looks up the entity id currently holding `index` under `kind`.
    pub fn get_by_index(&self, kind: EntityKind, index: u32) -> Result<String, IndexError> {
        let state = self.load()?;
        state
            .kinds
            .get(&kind)
            .and_then(|k| k.active.get(&index))
            .cloned()
            .ok_or(IndexError::NotFound(index))
    }

    /// Looks up the index currently allocated to `entity_id` under `kind`.
    pub fn get_by_entity(&self, kind: EntityKind, entity_id: &str) -> Result<u32, IndexError> {
        let state = self.load()?;
        state
            .kinds
            .get(&kind)
            .and_then(|k| k.active.iter().find(|(_, v)| v.as_str() == entity_id).map(|(i, _)| *i))
            .ok_or_else(|| IndexError::NotAllocated(entity_id.to_string()))
    }

    /// Rebuilds `kind`'s active map from a known-good list of entity ids,
    /// releasing indices for ids no longer present and leaving existing
    /// allocations for surviving ids untouched. Used to recover from a
    /// corrupt or stale `index.state.yaml`.
    pub fn reconcile(&self, kind: EntityKind, live_entity_ids: &[String]) -> Result<(), IndexError> {
        let result: Result<(), UpdateError<std::convert::Infallible>> =
            self.file_manager.update(&self.state_path, |state: &mut IndexState| {
                let kind_state = state.kinds.entry(kind).or_default();
                let stale: Vec<u32> = kind_state
                    .active
                    .iter()
                    .filter(|(_, id)| !live_entity_ids.contains(id))
                    .map(|(idx, _)| *idx)
                    .collect();
                for idx in stale {
                    kind_state.active.remove(&idx);
                    kind_state.released.insert(idx);
                }
                for id in live_entity_ids {
                    if !kind_state.active.values().any(|v| v == id) {
                        allocate_index(kind_state, id);
                    }
                }
                Ok(())
            });
        match result {
            Ok(()) => Ok(()),
            Err(UpdateError::FileManager(fe)) => Err(IndexError::FileManager(fe)),
            Err(UpdateError::Apply(never)) => match never {},
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }
}

fn allocate_index(kind_state: &mut KindState, entity_id: &str) -> u32 {
    let index = match kind_state.released.iter().next().copied() {
        Some(lowest) => {
            kind_state.released.remove(&lowest);
            lowest
        }
        None => {
            let next = kind_state.counter;
            kind_state.counter += 1;
            next
        }
    };
    kind_state.active.insert(index, entity_id.to_string());
    index
}

#[cfg(test)]
#[path = "index_allocator_tests.rs"]
mod tests;
