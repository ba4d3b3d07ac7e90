// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn terminal_states_never_transition() {
    for terminal in [
        SessionStatus::Completed,
        SessionStatus::Stopped,
        SessionStatus::Failed,
    ] {
        for to in [SessionStatus::Working, SessionStatus::Idle, SessionStatus::Starting] {
            assert!(!terminal.can_transition_to(to));
        }
    }
}

#[test]
fn orphaned_is_a_dead_end() {
    assert!(!SessionStatus::Orphaned.can_transition_to(SessionStatus::Working));
}

#[test]
fn re_entering_current_state_is_rejected() {
    assert!(!SessionStatus::Working.can_transition_to(SessionStatus::Working));
}

#[test]
fn happy_path_transitions_are_allowed() {
    assert!(SessionStatus::Created.can_transition_to(SessionStatus::Starting));
    assert!(SessionStatus::Starting.can_transition_to(SessionStatus::Working));
    assert!(SessionStatus::Working.can_transition_to(SessionStatus::Idle));
    assert!(SessionStatus::Idle.can_transition_to(SessionStatus::Working));
    assert!(SessionStatus::Working.can_transition_to(SessionStatus::Stopping));
    assert!(SessionStatus::Stopping.can_transition_to(SessionStatus::Stopped));
}

#[test]
fn any_non_terminal_state_can_orphan() {
    for s in [
        SessionStatus::Created,
        SessionStatus::Starting,
        SessionStatus::Working,
        SessionStatus::Idle,
        SessionStatus::Stopping,
    ] {
        assert!(s.can_transition_to(SessionStatus::Orphaned));
    }
}

#[test]
fn skipping_starting_is_rejected() {
    assert!(!SessionStatus::Created.can_transition_to(SessionStatus::Working));
}

#[test]
fn command_as_shell_string_joins_argv() {
    let cmd = Command::Argv(vec!["bash".into(), "-lc".into(), "echo hi".into()]);
    assert_eq!(cmd.as_shell_string(), "bash -lc echo hi");
}
