// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Index allocator state shape.
//!
//! The kind of entity a short index aliases. New entity kinds (beyond
//! workspace/session) can be added here without touching the allocator
//! logic in `amux-storage`, which is generic over this enum.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Workspace,
    Session,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Workspace => write!(f, "workspace"),
            EntityKind::Session => write!(f, "session"),
        }
    }
}

/// Allocation bookkeeping for a single entity kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KindState {
    /// Next unused index if the released list is empty.
    pub counter: u32,
    /// index -> entity id, for currently-allocated indices.
    pub active: HashMap<u32, String>,
    /// Indices freed by `Release`, reused lowest-first.
    pub released: BTreeSet<u32>,
}

/// The full persisted allocator state (`index.state.yaml`), one `KindState`
/// per entity kind that has ever allocated an index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexState {
    pub kinds: HashMap<EntityKind, KindState>,
}
