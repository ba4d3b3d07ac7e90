// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mailbox entry data model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which side of the channel a message file lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn dir_name(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

/// One message file, `<unix_seconds>-<name>.md`, under a session's mailbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxEntry {
    pub timestamp: u64,
    pub direction: Direction,
    pub name: String,
    pub path: PathBuf,
}
