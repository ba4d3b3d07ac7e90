use super::*;

#[tokio::test]
async fn fake_checker_reports_configured_state() {
    let checker = FakeProcessChecker::new();
    assert!(!checker.has_children(42).await.unwrap());

    checker.set_has_children(42, true);
    assert!(checker.has_children(42).await.unwrap());

    checker.set_has_children(42, false);
    assert!(!checker.has_children(42).await.unwrap());
}

#[tokio::test]
async fn real_checker_reports_no_children_for_unused_pid() {
    let checker = RealProcessChecker::new();
    // PID 1 is init/PID namespace root in most sandboxes; an unlikely-to-exist
    // high PID is more reliable for "definitely has no children".
    let result = checker.has_children(u32::MAX - 1).await;
    assert!(matches!(result, Ok(false) | Err(_)));
}
