use super::*;
use amux_core::{AgentConfig, SequentialIdGen, SystemClock};
use amux_runtime::{DirectExecRuntime, FakeMultiplexerAdapter, FakeProcessChecker, MultiplexerRuntime};
use amux_workspace::FakeGitCapability;
use std::collections::HashMap;
use tempfile::tempdir;

struct Harness {
    sessions: SessionManager,
    multiplexer: Arc<FakeMultiplexerAdapter>,
    config: Config,
}

fn harness(state_dir: &Path, runtime_kind: RuntimeKind) -> Harness {
    let git = Arc::new(FakeGitCapability::new());
    let hooks = Arc::new(HookEngine::new(state_dir, Arc::new(SystemClock)));
    let index = Arc::new(IndexAllocator::new(state_dir.join("index.state.yaml")));
    let workspaces = Arc::new(WorkspaceManager::new(state_dir, git, hooks.clone(), index.clone(), Arc::new(SystemClock)));

    let multiplexer = Arc::new(FakeMultiplexerAdapter::new());
    let multiplexer_runtime: Arc<dyn Runtime> = Arc::new(MultiplexerRuntime::new((*multiplexer).clone()));
    let direct_exec_runtime: Arc<dyn Runtime> = Arc::new(DirectExecRuntime::new());
    let checker = Arc::new(FakeProcessChecker::new());

    let sessions = SessionManager::new(
        state_dir,
        workspaces,
        hooks,
        index,
        Arc::new(SystemClock),
        Arc::new(SequentialIdGen::new("sess")),
        multiplexer.clone(),
        multiplexer_runtime,
        direct_exec_runtime,
        checker,
    );

    let mut agents = HashMap::new();
    agents.insert(
        "echo".to_string(),
        AgentConfig {
            name: "echo".to_string(),
            runtime: runtime_kind,
            description: None,
            environment: HashMap::new(),
            working_dir: None,
            tags: vec![],
            runtime_options: serde_json::Value::Null,
            command: vec!["true".to_string()],
        },
    );
    let config = Config {
        version: Config::SUPPORTED_VERSION.to_string(),
        agents,
        mcp: None,
    };

    Harness { sessions, multiplexer, config }
}

#[tokio::test]
async fn create_with_multiplexer_runtime_starts_working() {
    let dir = tempdir().unwrap();
    let h = harness(dir.path(), RuntimeKind::TerminalMultiplexer);

    let session = h
        .sessions
        .create(
            dir.path(),
            &h.config,
            CreateOptions {
                agent_id: "echo".to_string(),
                no_hooks: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(session.status.status, SessionStatus::Working);
    assert!(session.multiplexer_session_name.is_some());
    assert_eq!(session.short_index, 0);
}

#[tokio::test]
async fn unknown_agent_is_not_found() {
    let dir = tempdir().unwrap();
    let h = harness(dir.path(), RuntimeKind::TerminalMultiplexer);

    let err = h
        .sessions
        .create(
            dir.path(),
            &h.config,
            CreateOptions {
                agent_id: "missing".to_string(),
                no_hooks: true,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AmuxError::NotFound(_)));
}

#[tokio::test]
async fn resolve_by_id_short_index_and_name() {
    let dir = tempdir().unwrap();
    let h = harness(dir.path(), RuntimeKind::TerminalMultiplexer);

    let session = h
        .sessions
        .create(
            dir.path(),
            &h.config,
            CreateOptions {
                agent_id: "echo".to_string(),
                name: Some("main".to_string()),
                no_hooks: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(h.sessions.resolve(session.id.as_str()).unwrap().id, session.id);
    assert_eq!(h.sessions.resolve(&session.short_index.to_string()).unwrap().id, session.id);
    assert_eq!(h.sessions.resolve("main").unwrap().id, session.id);
}

#[tokio::test]
async fn stop_transitions_multiplexer_session_to_stopped() {
    let dir = tempdir().unwrap();
    let h = harness(dir.path(), RuntimeKind::TerminalMultiplexer);

    let session = h
        .sessions
        .create(
            dir.path(),
            &h.config,
            CreateOptions {
                agent_id: "echo".to_string(),
                no_hooks: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let stopped = h.sessions.stop(session.id.as_str(), StopOptions { no_hooks: true }).await.unwrap();
    assert_eq!(stopped.status.status, SessionStatus::Stopped);
    assert!(stopped.stopped_at.is_some());
}

#[tokio::test]
async fn remove_refuses_while_running_then_succeeds_after_stop() {
    let dir = tempdir().unwrap();
    let h = harness(dir.path(), RuntimeKind::TerminalMultiplexer);

    let session = h
        .sessions
        .create(
            dir.path(),
            &h.config,
            CreateOptions {
                agent_id: "echo".to_string(),
                no_hooks: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = h.sessions.remove(session.id.as_str()).await.unwrap_err();
    assert!(matches!(err, AmuxError::AlreadyInState(_)));

    h.sessions.stop(session.id.as_str(), StopOptions { no_hooks: true }).await.unwrap();
    h.sessions.remove(session.id.as_str()).await.unwrap();
    assert!(h.sessions.resolve(session.id.as_str()).is_err());
}

#[tokio::test]
async fn refresh_status_reflects_pane_output_change() {
    let dir = tempdir().unwrap();
    let h = harness(dir.path(), RuntimeKind::TerminalMultiplexer);

    let session = h
        .sessions
        .create(
            dir.path(),
            &h.config,
            CreateOptions {
                agent_id: "echo".to_string(),
                no_hooks: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let name = session.multiplexer_session_name.clone().unwrap();
    h.multiplexer.set_output(&name, "agent is thinking...");

    let refreshed = h.sessions.refresh_status(session.id.as_str()).await.unwrap();
    assert_eq!(refreshed.status.status, SessionStatus::Working);
    assert_ne!(refreshed.status.last_output_hash, 0);
}

#[tokio::test]
async fn output_captures_pane_contents() {
    let dir = tempdir().unwrap();
    let h = harness(dir.path(), RuntimeKind::TerminalMultiplexer);

    let session = h
        .sessions
        .create(
            dir.path(),
            &h.config,
            CreateOptions {
                agent_id: "echo".to_string(),
                no_hooks: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let name = session.multiplexer_session_name.clone().unwrap();
    h.multiplexer.set_output(&name, "hello from the pane");

    let output = h.sessions.output(session.id.as_str(), 20).await.unwrap();
    assert_eq!(output.as_deref(), Some("hello from the pane"));
}

#[tokio::test]
async fn direct_exec_session_runs_and_stops() {
    let dir = tempdir().unwrap();
    let h = harness(dir.path(), RuntimeKind::DirectExec);

    let session = h
        .sessions
        .create(
            dir.path(),
            &h.config,
            CreateOptions {
                agent_id: "echo".to_string(),
                no_hooks: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(session.runtime_kind, RuntimeKind::DirectExec);
    assert!(session.multiplexer_session_name.is_none());

    let stopped = h.sessions.stop(session.id.as_str(), StopOptions { no_hooks: true }).await.unwrap();
    assert!(matches!(stopped.status.status, SessionStatus::Stopped | SessionStatus::Failed));
}
