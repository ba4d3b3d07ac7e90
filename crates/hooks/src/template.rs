// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Starter `hooks.yaml` content for `hooks_init`.

use std::io;
use std::path::{Path, PathBuf};

const TEMPLATE: &str = r#"# amux hooks configuration.
#
# Each event maps to an ordered list of hooks. A hook needs either
# `command` (a shell one-liner) or `script` (a path, relative to this
# file's directory unless absolute) — never both.
#
# on_error: warn (default) | fail | ignore
# timeout: "5m" (default), "30s", "1h", ...
#
# Nothing here runs until the config is explicitly trusted with
# `amux hooks trust`.
#
# session_start:
#   - name: announce
#     command: echo "session $AMUX_SESSION_ID starting"
#
# session_stop: []
# workspace_create: []
# workspace_remove: []
"#;

/// Path `hooks_init` writes to: `<project_root>/.amux/hooks.yaml`.
pub fn default_hooks_template_path(project_root: &Path) -> PathBuf {
    project_root.join(".amux").join("hooks.yaml")
}

/// Writes the starter template to `path` unless something is already
/// there. Returns whether it created the file.
pub fn write_default_template(path: &Path) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, TEMPLATE)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_template_only_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hooks.yaml");

        assert!(write_default_template(&path).unwrap());
        assert!(path.exists());

        std::fs::write(&path, "custom content").unwrap();
        assert!(!write_default_template(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "custom content");
    }

    #[test]
    fn default_path_is_under_dot_amux() {
        let path = default_hooks_template_path(Path::new("/repo"));
        assert_eq!(path, Path::new("/repo/.amux/hooks.yaml"));
    }
}
