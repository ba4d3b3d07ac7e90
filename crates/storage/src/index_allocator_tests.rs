use super::*;
use tempfile::tempdir;

#[test]
fn acquire_assigns_zero_then_increments() {
    let dir = tempdir().unwrap();
    let alloc = IndexAllocator::new(dir.path().join("index.state.yaml"));
    let a = alloc.acquire(EntityKind::Workspace, "ws-a").unwrap();
    let b = alloc.acquire(EntityKind::Workspace, "ws-b").unwrap();
    assert_eq!(a, 0);
    assert_eq!(b, 1);
}

#[test]
fn released_index_is_reused_before_minting_new() {
    let dir = tempdir().unwrap();
    let alloc = IndexAllocator::new(dir.path().join("index.state.yaml"));
    let a = alloc.acquire(EntityKind::Workspace, "ws-a").unwrap();
    let _b = alloc.acquire(EntityKind::Workspace, "ws-b").unwrap();
    alloc.release(EntityKind::Workspace, a).unwrap();
    let c = alloc.acquire(EntityKind::Workspace, "ws-c").unwrap();
    assert_eq!(c, a);
}

#[test]
fn kinds_are_independent_sequences() {
    let dir = tempdir().unwrap();
    let alloc = IndexAllocator::new(dir.path().join("index.state.yaml"));
    let ws = alloc.acquire(EntityKind::Workspace, "ws-a").unwrap();
    let sess = alloc.acquire(EntityKind::Session, "sess-a").unwrap();
    assert_eq!(ws, 0);
    assert_eq!(sess, 0);
}

#[test]
fn get_by_index_and_get_by_entity_round_trip() {
    let dir = tempdir().unwrap();
    let alloc = IndexAllocator::new(dir.path().join("index.state.yaml"));
    let idx = alloc.acquire(EntityKind::Session, "sess-x").unwrap();
    assert_eq!(alloc.get_by_index(EntityKind::Session, idx).unwrap(), "sess-x");
    assert_eq!(alloc.get_by_entity(EntityKind::Session, "sess-x").unwrap(), idx);
}

#[test]
fn release_of_unknown_index_is_not_found() {
    let dir = tempdir().unwrap();
    let alloc = IndexAllocator::new(dir.path().join("index.state.yaml"));
    let err = alloc.release(EntityKind::Workspace, 42).unwrap_err();
    assert!(matches!(err, IndexError::NotFound(42)));
}

#[test]
fn reconcile_releases_stale_and_allocates_missing() {
    let dir = tempdir().unwrap();
    let alloc = IndexAllocator::new(dir.path().join("index.state.yaml"));
    let stale = alloc.acquire(EntityKind::Workspace, "ws-gone").unwrap();
    alloc.acquire(EntityKind::Workspace, "ws-kept").unwrap();

    alloc
        .reconcile(EntityKind::Workspace, &["ws-kept".to_string(), "ws-new".to_string()])
        .unwrap();

    assert!(alloc.get_by_entity(EntityKind::Workspace, "ws-gone").is_err());
    assert!(alloc.get_by_entity(EntityKind::Workspace, "ws-kept").is_ok());
    let new_idx = alloc.get_by_entity(EntityKind::Workspace, "ws-new").unwrap();
    assert_eq!(new_idx, stale, "reconcile should reuse the freed index for the new entity");
}
