// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! amux-session: starts, classifies, and tears down supervised agent
//! sessions bound to a workspace.

pub mod classification;
pub mod manager;

pub use classification::{classify, fnv1a32, RuntimeHandle, StatusUpdate};
pub use manager::{CreateOptions, ListOptions, SessionManager, StopOptions};
