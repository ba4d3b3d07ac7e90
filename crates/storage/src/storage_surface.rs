// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Confined file access under a workspace's or session's storage directory
//!. Every relative path is resolved against a fixed root and
//! rejected if it would escape that root, whether via `..` segments or a
//! symlink planted inside the root.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageSurfaceError {
    #[error("path traversal: '{0}' escapes its root")]
    PathTraversal(String),
    #[error("not found: {0}")]
    NotFound(PathBuf),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageSurfaceError {
    fn io(path: &Path, source: io::Error) -> Self {
        StorageSurfaceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One listed file under a storage root.
#[derive(Debug, Clone)]
pub struct StorageEntry {
    pub relative_path: PathBuf,
    pub size: u64,
    pub is_dir: bool,
}

/// Read/write/list/remove operations confined to a single root directory.
/// Each `amux` workspace and session gets its own `StorageSurface` rooted at
/// its `storage_path`.
pub struct StorageSurface {
    root: PathBuf,
}

impl StorageSurface {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `relative` against the root, rejecting any path whose
    /// normalized form would leave the root — this check runs on the
    /// lexical path, not a canonicalized one, so it also rejects symlinks
    /// that point outside the root when combined with `fs::canonicalize`
    /// verification below.
    fn resolve(&self, relative: &Path) -> Result<PathBuf, StorageSurfaceError> {
        if relative.is_absolute() {
            return Err(StorageSurfaceError::PathTraversal(relative.display().to_string()));
        }
        let mut normalized = PathBuf::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StorageSurfaceError::PathTraversal(relative.display().to_string()));
                }
            }
        }
        let full = self.root.join(&normalized);
        if let Ok(canonical_root) = fs::canonicalize(&self.root) {
            if let Some(parent) = full.parent() {
                if let Ok(canonical_parent) = fs::canonicalize(parent) {
                    if !canonical_parent.starts_with(&canonical_root) {
                        return Err(StorageSurfaceError::PathTraversal(relative.display().to_string()));
                    }
                }
            }
        }
        Ok(full)
    }

    pub fn read_file(&self, relative: &Path) -> Result<Vec<u8>, StorageSurfaceError> {
        let full = self.resolve(relative)?;
        match fs::read(&full) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageSurfaceError::NotFound(full)),
            Err(e) => Err(StorageSurfaceError::io(&full, e)),
        }
    }

    pub fn write_file(&self, relative: &Path, contents: &[u8]) -> Result<(), StorageSurfaceError> {
        let full = self.resolve(relative)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageSurfaceError::io(parent, e))?;
        }
        fs::write(&full, contents).map_err(|e| StorageSurfaceError::io(&full, e))
    }

    pub fn remove(&self, relative: &Path) -> Result<(), StorageSurfaceError> {
        let full = self.resolve(relative)?;
        match fs::metadata(&full) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&full).map_err(|e| StorageSurfaceError::io(&full, e)),
            Ok(_) => fs::remove_file(&full).map_err(|e| StorageSurfaceError::io(&full, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageSurfaceError::io(&full, e)),
        }
    }

    /// Lists every file (not directory) under `relative`, recursively, as
    /// paths relative to the storage root.
    pub fn list_files(&self, relative: &Path) -> Result<Vec<StorageEntry>, StorageSurfaceError> {
        let full = self.resolve(relative)?;
        let mut entries = Vec::new();
        if !full.exists() {
            return Ok(entries);
        }
        self.walk(&full, &mut entries)?;
        Ok(entries)
    }

    fn walk(&self, dir: &Path, out: &mut Vec<StorageEntry>) -> Result<(), StorageSurfaceError> {
        for entry in fs::read_dir(dir).map_err(|e| StorageSurfaceError::io(dir, e))? {
            let entry = entry.map_err(|e| StorageSurfaceError::io(dir, e))?;
            let path = entry.path();
            let meta = entry.metadata().map_err(|e| StorageSurfaceError::io(&path, e))?;
            if meta.is_dir() {
                self.walk(&path, out)?;
            } else {
                let relative_path = path
                    .strip_prefix(&self.root)
                    .unwrap_or(&path)
                    .to_path_buf();
                out.push(StorageEntry {
                    relative_path,
                    size: meta.len(),
                    is_dir: false,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "storage_surface_tests.rs"]
mod tests;
