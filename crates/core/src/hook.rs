// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hook configuration data model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A lifecycle event a hook can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    WorkspaceCreate,
    WorkspaceRemove,
    SessionStart,
    SessionStop,
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HookEvent::WorkspaceCreate => "workspace_create",
            HookEvent::WorkspaceRemove => "workspace_remove",
            HookEvent::SessionStart => "session_start",
            HookEvent::SessionStop => "session_stop",
        };
        write!(f, "{s}")
    }
}

/// What to do when a hook exits non-zero or fails to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    Fail,
    #[default]
    Warn,
    Ignore,
}

fn default_timeout() -> Duration {
    Duration::from_secs(5 * 60)
}

/// Either an inline command or a script path; exactly one must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,
    #[serde(default = "default_timeout", with = "humantime_duration")]
    pub timeout: Duration,
    #[serde(default)]
    pub on_error: OnError,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// Map from lifecycle event to the ordered list of hooks that run on it.
pub type HookConfig = HashMap<HookEvent, Vec<HookSpec>>;

/// Who/when a hook config was marked safe to execute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustRecord {
    /// SHA-256 over the canonical serialization of the hook config.
    pub hash: String,
    pub trusted_by: String,
    pub trusted_at: u64,
}

/// Minimal `"5m"` / `"30s"` duration (de)serialization so hooks.yaml stays
/// human-writable instead of exposing `{secs, nanos}`.
mod humantime_duration {
    use super::Duration;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("{}s", d.as_secs()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(D::Error::custom)
    }

    /// Parses `"5m"`, `"30s"`, `"1h"`; falls back to the caller's default on
    /// malformed input rather than rejecting the whole document.
    pub fn parse(raw: &str) -> Result<Duration, String> {
        let raw = raw.trim();
        let (num, unit) = raw.split_at(raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len()));
        let n: u64 = num.parse().map_err(|_| format!("bad duration: {raw}"))?;
        let secs = match unit {
            "s" | "" => n,
            "m" => n * 60,
            "h" => n * 3600,
            other => return Err(format!("unknown duration unit: {other}")),
        };
        Ok(Duration::from_secs(secs))
    }
}

pub use humantime_duration::parse as parse_duration_or_default;
