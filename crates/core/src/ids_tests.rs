// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn workspace_id_roundtrips_through_json() {
    let id = WorkspaceId::new("ws-123");
    let json = serde_json::to_string(&id).unwrap();
    let back: WorkspaceId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, back);
}

#[test]
fn session_id_short_truncates() {
    let id = SessionId::new("0123456789abcdef");
    assert_eq!(id.short(8), "01234567");
}

#[test]
fn session_id_compares_to_str() {
    let id = SessionId::new("abc");
    assert_eq!(id, "abc");
}
