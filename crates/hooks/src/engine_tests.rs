use super::*;
use amux_core::{HookEvent, HookSpec, OnError, SystemClock};
use std::collections::HashMap;
use tempfile::tempdir;

fn write_hooks_yaml(dir: &Path, contents: &str) {
    std::fs::write(dir.join("hooks.yaml"), contents).unwrap();
}

fn trust_current(engine: &HookEngine) {
    let config = engine.load_config().unwrap();
    let hash = hash_hook_config(&config).unwrap();
    engine.trust_store().trust(hash, "operator", 1000).unwrap();
}

#[tokio::test]
async fn missing_hooks_yaml_runs_nothing() {
    let dir = tempdir().unwrap();
    let engine = HookEngine::new(dir.path(), Arc::new(SystemClock));
    let results = engine
        .run_event(HookEvent::SessionStart, dir.path(), &HookContext::default())
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn untrusted_hooks_yaml_is_silently_skipped() {
    let dir = tempdir().unwrap();
    write_hooks_yaml(
        &dir.path().to_path_buf(),
        "session_start:\n  - name: notify\n    command: echo hi\n",
    );
    let engine = HookEngine::new(dir.path(), Arc::new(SystemClock));
    let results = engine
        .run_event(HookEvent::SessionStart, dir.path(), &HookContext::default())
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn trusted_hooks_run_for_matching_event() {
    let dir = tempdir().unwrap();
    write_hooks_yaml(
        dir.path(),
        "session_start:\n  - name: notify\n    command: echo hi\nsession_stop:\n  - name: cleanup\n    command: echo bye\n",
    );
    let engine = HookEngine::new(dir.path(), Arc::new(SystemClock));
    trust_current(&engine);

    let results = engine
        .run_event(HookEvent::SessionStart, dir.path(), &HookContext::default())
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "notify");
}

#[tokio::test]
async fn event_with_no_configured_hooks_is_a_noop() {
    let dir = tempdir().unwrap();
    write_hooks_yaml(dir.path(), "session_start:\n  - name: notify\n    command: echo hi\n");
    let engine = HookEngine::new(dir.path(), Arc::new(SystemClock));
    trust_current(&engine);

    let results = engine
        .run_event(HookEvent::WorkspaceCreate, dir.path(), &HookContext::default())
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn context_env_reaches_the_hook_command() {
    let dir = tempdir().unwrap();
    write_hooks_yaml(
        dir.path(),
        "workspace_create:\n  - name: show\n    command: echo $AMUX_WORKSPACE_NAME\n",
    );
    let engine = HookEngine::new(dir.path(), Arc::new(SystemClock));
    trust_current(&engine);

    let context = HookContext {
        workspace_name: Some("feature-x".to_string()),
        ..Default::default()
    };
    let results = engine
        .run_event(HookEvent::WorkspaceCreate, dir.path(), &context)
        .await
        .unwrap();
    assert!(results[0].output.contains("feature-x"));
}

#[test]
fn hooks_for_event_returns_configured_list() {
    let dir = tempdir().unwrap();
    let engine = HookEngine::new(dir.path(), Arc::new(SystemClock));
    let mut config = amux_core::HookConfig::new();
    config.insert(
        HookEvent::SessionStop,
        vec![HookSpec {
            name: "cleanup".to_string(),
            command: Some("echo bye".to_string()),
            script: None,
            timeout: std::time::Duration::from_secs(5),
            on_error: OnError::Warn,
            env: HashMap::new(),
        }],
    );
    assert_eq!(engine.hooks_for_event(&config, HookEvent::SessionStop).len(), 1);
    assert!(engine.hooks_for_event(&config, HookEvent::SessionStart).is_empty());
}
