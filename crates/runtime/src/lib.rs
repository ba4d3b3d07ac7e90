// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! amux-runtime: uniform process supervision over a direct-exec backend and
//! a terminal-multiplexer backend.

pub mod direct_exec;
pub mod multiplexer;
pub mod multiplexer_runtime;
pub mod process;
pub mod process_checker;
pub mod runtime;
pub mod subprocess;

pub use direct_exec::{DirectExecProcess, DirectExecRuntime};
pub use multiplexer::{MultiplexerAdapter, TmuxMultiplexerAdapter};
pub use multiplexer_runtime::{multiplexer_session_name, MultiplexerRuntime};
pub use process::{ExecutionSpec, Process, ProcessError, ProcessMetadata, ProcessState, GRACEFUL_STOP_WINDOW};
pub use process_checker::{ProcessChecker, RealProcessChecker};
pub use runtime::Runtime;

#[cfg(any(test, feature = "test-support"))]
pub use multiplexer::FakeMultiplexerAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use process_checker::FakeProcessChecker;
