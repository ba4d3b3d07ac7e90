use super::*;
use crate::multiplexer::FakeMultiplexerAdapter;
use std::collections::HashMap;
use std::path::PathBuf;

fn spec() -> ExecutionSpec {
    ExecutionSpec {
        argv: vec!["bash".to_string()],
        env: HashMap::new(),
        working_dir: PathBuf::from("."),
        runtime_options: serde_json::Value::Null,
        initial_input: None,
    }
}

#[test]
fn derives_session_name_from_workspace_agent_and_time() {
    let name = multiplexer_session_name("w1", "claude", 1700000000);
    assert_eq!(name, "amux-w1-claude-1700000000");
}

#[tokio::test]
async fn validate_reflects_adapter_availability() {
    let adapter = FakeMultiplexerAdapter::new();
    adapter.set_available(false);
    let runtime = MultiplexerRuntime::new(adapter);
    assert!(!runtime.validate().await);
}

#[tokio::test]
async fn start_then_find_then_list() {
    let adapter = FakeMultiplexerAdapter::new();
    let runtime = MultiplexerRuntime::new(adapter);
    let process = runtime.start("sess-1", spec()).await.unwrap();
    assert_eq!(process.id(), "sess-1");
    assert!(runtime.find("sess-1").await.is_ok());
    assert_eq!(runtime.list().await.unwrap(), vec!["sess-1".to_string()]);
}

#[tokio::test]
async fn state_reports_running_until_pane_dies() {
    let adapter = FakeMultiplexerAdapter::new();
    let runtime = MultiplexerRuntime::new(adapter.clone());
    let process = runtime.start("sess-1", spec()).await.unwrap();
    assert_eq!(process.state().await.unwrap(), ProcessState::Running);
    adapter.mark_pane_dead("sess-1", 0);
    assert_eq!(process.state().await.unwrap(), ProcessState::Stopped);
}

#[tokio::test]
async fn nonzero_exit_is_failed() {
    let adapter = FakeMultiplexerAdapter::new();
    let runtime = MultiplexerRuntime::new(adapter.clone());
    let process = runtime.start("sess-1", spec()).await.unwrap();
    adapter.mark_pane_dead("sess-1", 1);
    assert_eq!(process.state().await.unwrap(), ProcessState::Failed);
}

#[tokio::test]
async fn find_unknown_session_is_not_found() {
    let adapter = FakeMultiplexerAdapter::new();
    let runtime = MultiplexerRuntime::new(adapter);
    let err = runtime.find("nope").await.unwrap_err();
    assert!(matches!(err, ProcessError::NotFound(_)));
}
