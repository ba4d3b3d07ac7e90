// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! amux-config: loads and schema-validates `config.yaml`.
//!
//! `amux_core::config` defines the shape; this crate is where unknown
//! fields, bad agent IDs, and an unsupported `version` turn into a
//! rejection instead of quietly deserializing something wrong.

mod validate;

use amux_core::Config;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub use validate::ValidationError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Loads and validates `config.yaml` at `path`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(&raw, path)
}

/// Parses and validates config YAML already read into memory. `path` is
/// used only for error messages.
pub fn parse(raw: &str, path: &Path) -> Result<Config, ConfigError> {
    let document: serde_yaml::Value = serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate::check_shape(&document)?;

    let config: Config = serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate::check_semantics(&config)?;
    Ok(config)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
