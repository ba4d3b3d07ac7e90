use super::*;
use amux_core::FakeClock;
use tempfile::tempdir;

fn session_id() -> SessionId {
    SessionId::from("sess-1".to_string())
}

#[test]
fn initialize_creates_tree_and_context_file() {
    let dir = tempdir().unwrap();
    let mgr = MailboxManager::new(dir.path(), Arc::new(FakeClock::new(0)));
    let id = session_id();

    mgr.initialize(&id).unwrap();

    let session_dir = dir.path().join("mailbox").join(id.as_str());
    assert!(session_dir.join("in").is_dir());
    assert!(session_dir.join("out").is_dir());
    assert!(session_dir.join("context.md").is_file());
}

#[test]
fn initialize_does_not_clobber_existing_context() {
    let dir = tempdir().unwrap();
    let mgr = MailboxManager::new(dir.path(), Arc::new(FakeClock::new(0)));
    let id = session_id();

    mgr.initialize(&id).unwrap();
    let context_path = dir.path().join("mailbox").join(id.as_str()).join("context.md");
    fs::write(&context_path, "operator notes").unwrap();

    mgr.initialize(&id).unwrap();
    assert_eq!(fs::read_to_string(&context_path).unwrap(), "operator notes");
}

#[test]
fn send_message_writes_into_in_with_sanitized_name() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(1_700_000_000));
    let mgr = MailboxManager::new(dir.path(), clock);
    let id = session_id();
    mgr.initialize(&id).unwrap();

    let entry = mgr.send_message(&id, "status update!!", "hello agent").unwrap();

    assert_eq!(entry.timestamp, 1_700_000_000);
    assert_eq!(entry.direction, Direction::In);
    assert_eq!(entry.name, "status-update");
    assert!(entry.path.ends_with("in/1700000000-status-update.md"));
    assert_eq!(fs::read_to_string(&entry.path).unwrap(), "hello agent");
}

#[test]
fn list_messages_sorts_newest_first_and_applies_limit() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(100));
    let mgr = MailboxManager::new(dir.path(), clock.clone());
    let id = session_id();
    mgr.initialize(&id).unwrap();

    mgr.send_message(&id, "first", "1").unwrap();
    clock.set(200);
    mgr.send_message(&id, "second", "2").unwrap();
    clock.set(300);
    mgr.send_message(&id, "third", "3").unwrap();

    let all = mgr.list_messages(&id, ListOptions::default()).unwrap();
    let names: Vec<&str> = all.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["third", "second", "first"]);

    let limited = mgr.list_messages(&id, ListOptions { direction: None, limit: Some(2) }).unwrap();
    assert_eq!(limited.len(), 2);
}

#[test]
fn list_messages_filters_by_direction() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(FakeClock::new(50));
    let mgr = MailboxManager::new(dir.path(), clock);
    let id = session_id();
    mgr.initialize(&id).unwrap();
    mgr.send_message(&id, "from-operator", "hi").unwrap();

    let out_dir = dir.path().join("mailbox").join(id.as_str()).join("out");
    fs::write(out_dir.join("50-from-agent.md"), "reply").unwrap();

    let inbound = mgr.list_messages(&id, ListOptions { direction: Some(Direction::In), limit: None }).unwrap();
    assert_eq!(inbound.len(), 1);
    assert_eq!(inbound[0].direction, Direction::In);

    let outbound = mgr.list_messages(&id, ListOptions { direction: Some(Direction::Out), limit: None }).unwrap();
    assert_eq!(outbound.len(), 1);
    assert_eq!(outbound[0].direction, Direction::Out);
}

#[test]
fn read_message_returns_utf8_contents() {
    let dir = tempdir().unwrap();
    let mgr = MailboxManager::new(dir.path(), Arc::new(FakeClock::new(0)));
    let id = session_id();
    mgr.initialize(&id).unwrap();
    let entry = mgr.send_message(&id, "note", "some content here").unwrap();

    assert_eq!(mgr.read_message(&entry).unwrap(), "some content here");
}

#[test]
fn clean_removes_the_whole_tree() {
    let dir = tempdir().unwrap();
    let mgr = MailboxManager::new(dir.path(), Arc::new(FakeClock::new(0)));
    let id = session_id();
    mgr.initialize(&id).unwrap();
    mgr.send_message(&id, "note", "x").unwrap();

    mgr.clean(&id).unwrap();
    assert!(!dir.path().join("mailbox").join(id.as_str()).exists());

    // Idempotent: cleaning an already-clean mailbox is not an error.
    mgr.clean(&id).unwrap();
}

#[test]
fn malformed_filenames_are_ignored_by_list() {
    let dir = tempdir().unwrap();
    let mgr = MailboxManager::new(dir.path(), Arc::new(FakeClock::new(0)));
    let id = session_id();
    mgr.initialize(&id).unwrap();

    let in_dir = dir.path().join("mailbox").join(id.as_str()).join("in");
    fs::write(in_dir.join("not-a-timestamp.md"), "garbage").unwrap();
    fs::write(in_dir.join("123-ok.txt"), "wrong extension").unwrap();

    let entries = mgr.list_messages(&id, ListOptions::default()).unwrap();
    assert!(entries.is_empty());
}
