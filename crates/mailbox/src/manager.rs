// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mailbox Manager: per-session append-only message files
//! under `<amux>/mailbox/<sessionID>/{in,out,context.md}`.

use crate::sanitize::sanitize_name;
use amux_core::{AmuxError, Clock, Direction, MailboxEntry, Result, SessionId};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

const CONTEXT_TEMPLATE: &str = "# Session context\n\nNotes written here are visible to the agent but are not a message.\n";

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub direction: Option<Direction>,
    pub limit: Option<usize>,
}

/// Owns the `mailbox/` directory: one subdirectory per session.
pub struct MailboxManager {
    root: PathBuf,
    clock: Arc<dyn Clock>,
}

impl MailboxManager {
    pub fn new(amux_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            root: amux_dir.into().join("mailbox"),
            clock,
        }
    }

    fn session_dir(&self, session_id: &SessionId) -> PathBuf {
        self.root.join(session_id.as_str())
    }

    fn direction_dir(&self, session_id: &SessionId, direction: Direction) -> PathBuf {
        self.session_dir(session_id).join(direction.dir_name())
    }

    /// Creates `in/`, `out/`, and a templated `context.md` if it doesn't
    /// already exist. Safe to call repeatedly.
    pub fn initialize(&self, session_id: &SessionId) -> Result<()> {
        let dir = self.session_dir(session_id);
        fs::create_dir_all(dir.join("in")).map_err(|e| AmuxError::External(e.into()))?;
        fs::create_dir_all(dir.join("out")).map_err(|e| AmuxError::External(e.into()))?;
        let context_path = dir.join("context.md");
        if !context_path.exists() {
            fs::write(&context_path, CONTEXT_TEMPLATE).map_err(|e| AmuxError::External(e.into()))?;
        }
        Ok(())
    }

    /// Writes `<unix>-<sanitized(name)>.md` into `in/`, returning the
    /// resulting entry. The mailbox must already be initialized.
    pub fn send_message(&self, session_id: &SessionId, name: &str, content: &str) -> Result<MailboxEntry> {
        let sanitized = sanitize_name(name);
        let timestamp = self.clock.now_secs();
        let filename = format!("{timestamp}-{sanitized}.md");
        let dir = self.direction_dir(session_id, Direction::In);
        fs::create_dir_all(&dir).map_err(|e| AmuxError::External(e.into()))?;
        let path = dir.join(&filename);
        fs::write(&path, content).map_err(|e| AmuxError::External(e.into()))?;
        Ok(MailboxEntry {
            timestamp,
            direction: Direction::In,
            name: sanitized,
            path,
        })
    }

    /// Enumerates message files, newest first (ties broken lexically by
    /// filename), optionally filtered to one direction and capped at
    /// `limit`.
    pub fn list_messages(&self, session_id: &SessionId, opts: ListOptions) -> Result<Vec<MailboxEntry>> {
        let directions = match opts.direction {
            Some(d) => vec![d],
            None => vec![Direction::In, Direction::Out],
        };

        let mut entries = Vec::new();
        for direction in directions {
            let dir = self.direction_dir(session_id, direction);
            if !dir.exists() {
                continue;
            }
            for entry in fs::read_dir(&dir).map_err(|e| AmuxError::External(e.into()))? {
                let entry = entry.map_err(|e| AmuxError::External(e.into()))?;
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if let Some((timestamp, name)) = parse_filename(file_name) {
                    entries.push(MailboxEntry {
                        timestamp,
                        direction,
                        name,
                        path,
                    });
                }
            }
        }

        entries.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
        });

        if let Some(limit) = opts.limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    /// Returns the file's contents as UTF-8 text.
    pub fn read_message(&self, entry: &MailboxEntry) -> Result<String> {
        fs::read_to_string(&entry.path).map_err(|e| AmuxError::External(e.into()))
    }

    /// Removes the session's whole mailbox tree.
    pub fn clean(&self, session_id: &SessionId) -> Result<()> {
        let dir = self.session_dir(session_id);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AmuxError::External(e.into())),
        }
    }
}

/// Parses `<unix_seconds>-<name>.md`, rejecting anything that doesn't match
/// the mailbox filename format.
fn parse_filename(file_name: &str) -> Option<(u64, String)> {
    let stem = file_name.strip_suffix(".md")?;
    let (digits, name) = stem.split_once('-')?;
    if digits.is_empty() || digits.len() > 19 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if name.is_empty() {
        return None;
    }
    let timestamp = digits.parse::<u64>().ok()?;
    Some((timestamp, name.to_string()))
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
