use super::*;
use crate::git::FakeGitCapability;
use amux_core::SystemClock;
use tempfile::tempdir;

fn manager(state_dir: &Path) -> (WorkspaceManager, Arc<FakeGitCapability>) {
    let git = Arc::new(FakeGitCapability::new());
    let hooks = Arc::new(HookEngine::new(state_dir, Arc::new(SystemClock)));
    let index = Arc::new(IndexAllocator::new(state_dir.join("index.state.yaml")));
    let manager = WorkspaceManager::new(state_dir, git.clone(), hooks, index, Arc::new(SystemClock));
    (manager, git)
}

#[tokio::test]
async fn create_writes_metadata_and_worktree() {
    let dir = tempdir().unwrap();
    let (manager, git) = manager(dir.path());
    let ws = manager
        .create(
            dir.path(),
            CreateOptions {
                name: "Feature X!".to_string(),
                description: "desc".to_string(),
                base_branch: None,
                auto_created: false,
            },
        )
        .await
        .unwrap();

    assert!(ws.name == "Feature X!");
    assert!(ws.branch.starts_with("amux/feature-x"));
    assert_eq!(ws.short_index, 0);
    assert!(git.worktree_exists(&ws.worktree_path));
    assert_eq!(ws.consistency, Some(WorkspaceConsistency::Consistent));
}

#[tokio::test]
async fn resolve_by_id_short_index_and_name() {
    let dir = tempdir().unwrap();
    let (manager, _git) = manager(dir.path());
    let ws = manager
        .create(dir.path(), CreateOptions { name: "alpha".to_string(), ..Default::default() })
        .await
        .unwrap();

    assert_eq!(manager.resolve(ws.id.as_str()).unwrap().id, ws.id);
    assert_eq!(manager.resolve(&ws.short_index.to_string()).unwrap().id, ws.id);
    assert_eq!(manager.resolve("alpha").unwrap().id, ws.id);
}

#[tokio::test]
async fn resolve_by_duplicate_name_is_ambiguous() {
    let dir = tempdir().unwrap();
    let (manager, _git) = manager(dir.path());
    manager.create(dir.path(), CreateOptions { name: "dup".to_string(), ..Default::default() }).await.unwrap();
    manager.create(dir.path(), CreateOptions { name: "dup".to_string(), ..Default::default() }).await.unwrap();

    let err = manager.resolve("dup").unwrap_err();
    assert!(matches!(err, AmuxError::Ambiguous(_)));
}

#[tokio::test]
async fn list_flags_worktree_missing_when_directory_gone() {
    let dir = tempdir().unwrap();
    let (manager, _git) = manager(dir.path());
    let ws = manager.create(dir.path(), CreateOptions { name: "beta".to_string(), ..Default::default() }).await.unwrap();
    std::fs::remove_dir_all(&ws.worktree_path).unwrap();

    let listed = manager.list(ListOptions::default()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].consistency, Some(WorkspaceConsistency::WorktreeMissing));
}

#[tokio::test]
async fn remove_refuses_when_held_unless_forced() {
    let dir = tempdir().unwrap();
    let (manager, _git) = manager(dir.path());
    let ws = manager.create(dir.path(), CreateOptions { name: "gamma".to_string(), ..Default::default() }).await.unwrap();
    manager.acquire(ws.id.as_str(), &"holder-1".to_string(), None, "working").unwrap();

    let err = manager.remove(dir.path(), ws.id.as_str(), RemoveOptions::default()).await.unwrap_err();
    assert!(matches!(err, AmuxError::AlreadyInState(_)));

    manager
        .remove(dir.path(), ws.id.as_str(), RemoveOptions { force: true })
        .await
        .unwrap();
    assert!(manager.resolve(ws.id.as_str()).is_err());
}

#[tokio::test]
async fn acquire_then_release_then_acquire_again() {
    let dir = tempdir().unwrap();
    let (manager, _git) = manager(dir.path());
    let ws = manager.create(dir.path(), CreateOptions { name: "delta".to_string(), ..Default::default() }).await.unwrap();

    let holder = "holder-1".to_string();
    manager.acquire(ws.id.as_str(), &holder, None, "working").unwrap();
    assert_eq!(manager.holders(ws.id.as_str()).unwrap().len(), 1);

    manager.release(ws.id.as_str(), &holder).unwrap();
    assert!(manager.holders(ws.id.as_str()).unwrap().is_empty());

    manager.acquire(ws.id.as_str(), &holder, None, "working again").unwrap();
    assert_eq!(manager.holders(ws.id.as_str()).unwrap().len(), 1);
}
