// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle hook engine: loads `hooks.yaml`, gates execution
//! behind an explicit trust record, and runs the hooks registered for a
//! given lifecycle event.

pub mod engine;
pub mod executor;
pub mod template;
pub mod trust;

pub use engine::{EngineError, HookContext, HookEngine};
pub use executor::{HookError, HookExecutor, HookResult};
pub use template::{default_hooks_template_path, write_default_template};
pub use trust::{hash_hook_config, TrustStore};
