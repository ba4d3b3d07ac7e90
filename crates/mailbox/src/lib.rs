// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! amux-mailbox: the structured message channel between an operator and a
//! session. Messages are append-only files under
//! `<amux>/mailbox/<sessionID>/{in,out}`; nothing is ever rewritten in
//! place.

pub mod manager;
pub mod sanitize;

pub use manager::{ListOptions, MailboxManager};
pub use sanitize::sanitize_name;
