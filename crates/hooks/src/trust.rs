// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trust gating: hooks only run if the SHA-256 of the
//! canonical serialized config matches a hash the operator has explicitly
//! recorded via `trust()`. This mirrors the config-hashing idiom used
//! elsewhere in this codebase to fingerprint a document before acting on it.

use amux_core::{HookConfig, TrustRecord};
use amux_storage::{FileManager, FileManagerError};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Computes the hex SHA-256 of `config`'s canonical JSON serialization.
pub fn hash_hook_config(config: &HookConfig) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_string(config)?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(format!("{:x}", digest))
}

pub struct TrustStore {
    path: PathBuf,
    file_manager: FileManager,
}

impl TrustStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_manager: FileManager::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Result<Option<TrustRecord>, FileManagerError> {
        match self.file_manager.read::<TrustRecord>(&self.path) {
            Ok((record, _)) => Ok(Some(record)),
            Err(FileManagerError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Records `hash` as trusted. This is an explicit operator action —
    /// nothing in this crate calls it implicitly.
    pub fn trust(&self, hash: String, trusted_by: &str, now: u64) -> Result<(), FileManagerError> {
        self.file_manager.write(
            &self.path,
            &TrustRecord {
                hash,
                trusted_by: trusted_by.to_string(),
                trusted_at: now,
            },
        )
    }

    /// Whether `config` currently matches the recorded trust hash.
    pub fn is_trusted(&self, config: &HookConfig) -> bool {
        let Ok(hash) = hash_hook_config(config) else {
            return false;
        };
        matches!(self.current(), Ok(Some(record)) if record.hash == hash)
    }
}

#[cfg(test)]
#[path = "trust_tests.rs"]
mod tests;
