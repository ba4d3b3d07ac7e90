// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed, lock-protected, atomically-written YAML files.
//!
//! Every on-disk document in amux (workspace.yaml, session.yaml, hooks.yaml,
//! ...) goes through this module. Locking uses `fs2` advisory file locks on
//! POSIX; on Windows a sidecar `<path>.lock` is locked instead and the final
//! rename is retried once after a short sleep to tolerate sharing
//! violations.

use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Default time budget for acquiring a file lock before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum FileManagerError {
    #[error("not found: {0}")]
    NotFound(PathBuf),
    #[error("concurrent modification of {0}")]
    ConcurrentModification(PathBuf),
    #[error("timed out acquiring lock on {0}")]
    LockTimeout(PathBuf),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("yaml error on {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl FileManagerError {
    fn io(path: &Path, source: io::Error) -> Self {
        FileManagerError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn yaml(path: &Path, source: serde_yaml::Error) -> Self {
        FileManagerError::Yaml {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Handle returned alongside a read: the path plus the mtime it was read at,
/// carried forward into `write_with_cas` to detect a racing writer.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub modified: SystemTime,
}

fn lock_path_for(path: &Path) -> PathBuf {
    if cfg!(windows) {
        let mut p = path.as_os_str().to_owned();
        p.push(".lock");
        PathBuf::from(p)
    } else {
        path.to_path_buf()
    }
}

fn open_for_lock(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).write(true).read(true).open(path)
}

fn acquire_exclusive(path: &Path, timeout: Duration) -> Result<File, FileManagerError> {
    let lock_path = lock_path_for(path);
    let file = open_for_lock(&lock_path).map_err(|e| FileManagerError::io(path, e))?;
    try_lock_with_timeout(&file, path, timeout, true)?;
    Ok(file)
}

fn acquire_shared(path: &Path, timeout: Duration) -> Result<File, FileManagerError> {
    let lock_path = lock_path_for(path);
    let file = open_for_lock(&lock_path).map_err(|e| FileManagerError::io(path, e))?;
    try_lock_with_timeout(&file, path, timeout, false)?;
    Ok(file)
}

fn try_lock_with_timeout(
    file: &File,
    reported_path: &Path,
    timeout: Duration,
    exclusive: bool,
) -> Result<(), FileManagerError> {
    let deadline = std::time::Instant::now() + timeout;
    loop {
        let result = if exclusive {
            fs2::FileExt::try_lock_exclusive(file)
        } else {
            fs2::FileExt::try_lock_shared(file)
        };
        match result {
            Ok(()) => return Ok(()),
            Err(_) if std::time::Instant::now() < deadline => {
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(_) => return Err(FileManagerError::LockTimeout(reported_path.to_path_buf())),
        }
    }
}

/// Atomically replace `path` with `contents`: write to `<path>.tmp`, fsync,
/// rename over the destination. On Windows, retries once after removing the
/// destination if the rename fails with a sharing violation.
fn atomic_write(path: &Path, contents: &[u8]) -> Result<(), FileManagerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| FileManagerError::io(path, e))?;
    }
    let tmp_path = path.with_extension(
        path.extension()
            .map(|ext| format!("{}.tmp", ext.to_string_lossy()))
            .unwrap_or_else(|| "tmp".to_string()),
    );
    {
        let mut tmp = File::create(&tmp_path).map_err(|e| FileManagerError::io(&tmp_path, e))?;
        use io::Write;
        tmp.write_all(contents)
            .map_err(|e| FileManagerError::io(&tmp_path, e))?;
        tmp.sync_all().map_err(|e| FileManagerError::io(&tmp_path, e))?;
    }
    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(e) if cfg!(windows) => {
            let _ = fs::remove_file(path);
            std::thread::sleep(Duration::from_millis(50));
            fs::rename(&tmp_path, path).map_err(|e2| FileManagerError::io(path, e2))?;
            let _ = e;
            Ok(())
        }
        Err(e) => Err(FileManagerError::io(path, e)),
    }
}

/// Typed load/store for a single YAML-backed record type, confined to one
/// path. Every operation is safe against concurrent callers in this process
/// and other processes via the OS file lock; `FileManager` holds no
/// in-process mutex of its own.
pub struct FileManager {
    lock_timeout: Duration,
}

impl Default for FileManager {
    fn default() -> Self {
        Self {
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}

impl FileManager {
    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self { lock_timeout }
    }

    pub fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<(T, FileInfo), FileManagerError> {
        if !path.exists() {
            return Err(FileManagerError::NotFound(path.to_path_buf()));
        }
        let _lock = acquire_shared(path, self.lock_timeout)?;
        let bytes = fs::read(path).map_err(|e| FileManagerError::io(path, e))?;
        let value: T = serde_yaml::from_slice(&bytes).map_err(|e| FileManagerError::yaml(path, e))?;
        let modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| FileManagerError::io(path, e))?;
        Ok((
            value,
            FileInfo {
                path: path.to_path_buf(),
                modified,
            },
        ))
    }

    pub fn write<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), FileManagerError> {
        let _lock = acquire_exclusive(path, self.lock_timeout)?;
        let text = serde_yaml::to_string(value).map_err(|e| FileManagerError::yaml(path, e))?;
        atomic_write(path, text.as_bytes())
    }

    /// Like `write`, but fails with `ConcurrentModification` if `path`'s
    /// mtime has moved since `info` was captured by an earlier `read`.
    pub fn write_with_cas<T: Serialize>(
        &self,
        path: &Path,
        value: &T,
        info: &FileInfo,
    ) -> Result<(), FileManagerError> {
        let _lock = acquire_exclusive(path, self.lock_timeout)?;
        if path.exists() {
            let current = fs::metadata(path)
                .and_then(|m| m.modified())
                .map_err(|e| FileManagerError::io(path, e))?;
            if current != info.modified {
                return Err(FileManagerError::ConcurrentModification(path.to_path_buf()));
            }
        }
        let text = serde_yaml::to_string(value).map_err(|e| FileManagerError::yaml(path, e))?;
        atomic_write(path, text.as_bytes())
    }

    /// Read-modify-write under one exclusive lock. Starts from `T::default()`
    /// if the file doesn't exist yet.
    pub fn update<T, R, F, E>(&self, path: &Path, f: F) -> Result<R, UpdateError<E>>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> Result<R, E>,
    {
        let _lock = acquire_exclusive(path, self.lock_timeout).map_err(UpdateError::FileManager)?;
        let mut value: T = if path.exists() {
            let bytes = fs::read(path).map_err(|e| UpdateError::FileManager(FileManagerError::io(path, e)))?;
            serde_yaml::from_slice(&bytes)
                .map_err(|e| UpdateError::FileManager(FileManagerError::yaml(path, e)))?
        } else {
            T::default()
        };
        let result = f(&mut value).map_err(UpdateError::Apply)?;
        let text = serde_yaml::to_string(&value)
            .map_err(|e| UpdateError::FileManager(FileManagerError::yaml(path, e)))?;
        atomic_write(path, text.as_bytes()).map_err(UpdateError::FileManager)?;
        Ok(result)
    }

    pub fn delete(&self, path: &Path) -> Result<(), FileManagerError> {
        let _lock = acquire_exclusive(path, self.lock_timeout)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FileManagerError::io(path, e)),
        }
    }
}

#[derive(Debug, Error)]
pub enum UpdateError<E> {
    #[error(transparent)]
    FileManager(#[from] FileManagerError),
    #[error("update closure failed: {0}")]
    Apply(E),
}

#[cfg(test)]
#[path = "file_manager_tests.rs"]
mod tests;
