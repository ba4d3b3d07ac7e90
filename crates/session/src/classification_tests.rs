use super::*;
use amux_runtime::{FakeMultiplexerAdapter, FakeProcessChecker, ProcessError, ProcessMetadata};
use async_trait::async_trait;

fn checker() -> FakeProcessChecker {
    FakeProcessChecker::new()
}

/// Minimal `Process` stand-in: direct-exec classification only reads
/// `state()`/`exit_code()`, so that's all this needs to provide.
struct StubProcess {
    state: ProcessState,
    exit_code: Option<i32>,
}

#[async_trait]
impl Process for StubProcess {
    fn id(&self) -> &str {
        "stub"
    }

    async fn state(&self) -> Result<ProcessState, ProcessError> {
        Ok(self.state)
    }

    async fn wait(&self) -> Result<(), ProcessError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), ProcessError> {
        Ok(())
    }

    async fn kill(&self) -> Result<(), ProcessError> {
        Ok(())
    }

    async fn output(&self, _lines: u32) -> Result<Option<String>, ProcessError> {
        Ok(None)
    }

    async fn exit_code(&self) -> Result<Option<i32>, ProcessError> {
        Ok(self.exit_code)
    }

    fn start_time(&self) -> u64 {
        0
    }

    async fn send_input(&self, _text: &str) -> Result<(), ProcessError> {
        Err(ProcessError::InputUnsupported)
    }

    fn metadata(&self) -> ProcessMetadata {
        ProcessMetadata::default()
    }
}

#[test]
fn fnv1a32_is_stable_and_sensitive_to_content() {
    let a = fnv1a32(b"hello");
    let b = fnv1a32(b"hello");
    let c = fnv1a32(b"hellp");
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn parse_trailing_int_reads_last_bare_number() {
    assert_eq!(parse_trailing_int("some output\n0\n"), Some(0));
    assert_eq!(parse_trailing_int("some output\n127\n"), Some(127));
    assert_eq!(parse_trailing_int("no numbers here"), None);
}

#[tokio::test]
async fn terminal_status_is_never_reclassified() {
    let adapter = FakeMultiplexerAdapter::new();
    let update = classify(
        SessionStatus::Completed,
        0,
        0,
        10,
        RuntimeHandle::Multiplexer { adapter: &adapter, session_name: "amux-1" },
        &checker(),
    )
    .await;
    assert!(update.is_none());
}

#[tokio::test]
async fn missing_multiplexer_session_fails_the_session() {
    let adapter = FakeMultiplexerAdapter::new();
    let update = classify(
        SessionStatus::Working,
        0,
        0,
        10,
        RuntimeHandle::Multiplexer { adapter: &adapter, session_name: "amux-ghost" },
        &checker(),
    )
    .await
    .expect("missing session must produce an update");
    assert_eq!(update.status, SessionStatus::Failed);
    assert!(update.error.unwrap().contains("no longer exists"));
}

#[tokio::test]
async fn dead_pane_fails_the_session_with_its_exit_code() {
    let adapter = FakeMultiplexerAdapter::new();
    adapter.create_session("amux-1", std::path::Path::new("."), "bash", &[]).await.unwrap();
    adapter.mark_pane_dead("amux-1", 9);

    let update = classify(
        SessionStatus::Working,
        0,
        0,
        10,
        RuntimeHandle::Multiplexer { adapter: &adapter, session_name: "amux-1" },
        &checker(),
    )
    .await
    .expect("dead pane must produce an update");
    assert_eq!(update.status, SessionStatus::Failed);
    assert_eq!(update.exit_code, Some(9));
}

#[tokio::test]
async fn pane_output_change_marks_working_and_records_hash() {
    let adapter = FakeMultiplexerAdapter::new();
    adapter.create_session("amux-1", std::path::Path::new("."), "bash", &[]).await.unwrap();
    adapter.set_output("amux-1", "still compiling...");

    let update = classify(
        SessionStatus::Idle,
        fnv1a32(b""),
        0,
        10,
        RuntimeHandle::Multiplexer { adapter: &adapter, session_name: "amux-1" },
        &checker(),
    )
    .await
    .expect("changed output must produce an update");

    assert_eq!(update.status, SessionStatus::Working);
    assert_eq!(update.last_output_hash, Some(fnv1a32(b"still compiling...")));
    assert_eq!(update.last_output_time, Some(10));
}

#[tokio::test]
async fn unchanged_output_past_threshold_goes_idle() {
    let adapter = FakeMultiplexerAdapter::new();
    adapter.create_session("amux-1", std::path::Path::new("."), "bash", &[]).await.unwrap();
    adapter.set_output("amux-1", "waiting for input");
    let hash = fnv1a32(b"waiting for input");

    let update = classify(
        SessionStatus::Working,
        hash,
        0,
        5,
        RuntimeHandle::Multiplexer { adapter: &adapter, session_name: "amux-1" },
        &checker(),
    )
    .await
    .expect("stale output past the idle threshold must produce an update");

    assert_eq!(update.status, SessionStatus::Idle);
}

#[tokio::test]
async fn unchanged_output_within_threshold_is_a_noop() {
    let adapter = FakeMultiplexerAdapter::new();
    adapter.create_session("amux-1", std::path::Path::new("."), "bash", &[]).await.unwrap();
    adapter.set_output("amux-1", "waiting for input");
    let hash = fnv1a32(b"waiting for input");

    let update = classify(
        SessionStatus::Working,
        hash,
        9,
        10,
        RuntimeHandle::Multiplexer { adapter: &adapter, session_name: "amux-1" },
        &checker(),
    )
    .await;

    assert!(update.is_none());
}

#[tokio::test]
async fn direct_exec_running_transitions_to_working() {
    let process = StubProcess { state: ProcessState::Running, exit_code: None };
    let update = classify(
        SessionStatus::Starting,
        0,
        0,
        0,
        RuntimeHandle::DirectExec { process: &process },
        &checker(),
    )
    .await
    .expect("starting to running must produce an update");
    assert_eq!(update.status, SessionStatus::Working);
}

#[tokio::test]
async fn direct_exec_success_completes() {
    let process = StubProcess { state: ProcessState::Stopped, exit_code: Some(0) };
    let update = classify(
        SessionStatus::Working,
        0,
        0,
        0,
        RuntimeHandle::DirectExec { process: &process },
        &checker(),
    )
    .await
    .expect("stopped process must produce an update");
    assert_eq!(update.status, SessionStatus::Completed);
    assert_eq!(update.exit_code, Some(0));
}

#[tokio::test]
async fn direct_exec_nonzero_exit_fails() {
    let process = StubProcess { state: ProcessState::Failed, exit_code: Some(1) };
    let update = classify(
        SessionStatus::Working,
        0,
        0,
        0,
        RuntimeHandle::DirectExec { process: &process },
        &checker(),
    )
    .await
    .expect("failed process must produce an update");
    assert_eq!(update.status, SessionStatus::Failed);
    assert_eq!(update.exit_code, Some(1));
}
