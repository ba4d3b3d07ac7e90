// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config data model.
//!
//! Shape only — loading from disk and schema-shape validation live in
//! `amux-config` so that crates which merely need the types (runtime,
//! session) don't pull in the validator.

use crate::session::RuntimeKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// RPC transport kind for the MCP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Stdio,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpTransportConfig {
    #[serde(rename = "type")]
    pub kind: TransportKind,
    #[serde(default)]
    pub addr: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(default)]
    pub transport: Option<McpTransportConfig>,
}

/// One entry in the agent catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    pub runtime: RuntimeKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub environment: HashMap<String, String>,
    #[serde(default, rename = "workingDir")]
    pub working_dir: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "runtimeOptions")]
    pub runtime_options: serde_json::Value,
    #[serde(default)]
    pub command: Vec<String>,
}

/// Top-level config document (`config.yaml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    pub agents: HashMap<String, AgentConfig>,
    #[serde(default)]
    pub mcp: Option<McpConfig>,
}

impl Config {
    pub const SUPPORTED_VERSION: &'static str = "1.0";

    pub fn agent(&self, id: &str) -> Option<&AgentConfig> {
        self.agents.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_yaml_roundtrips() {
        let mut agents = HashMap::new();
        agents.insert(
            "claude".to_string(),
            AgentConfig {
                name: "claude".into(),
                runtime: RuntimeKind::TerminalMultiplexer,
                description: Some("Claude agent".into()),
                environment: HashMap::new(),
                working_dir: None,
                tags: vec![],
                runtime_options: serde_json::Value::Null,
                command: vec!["claude".into()],
            },
        );
        let cfg = Config {
            version: "1.0".into(),
            agents,
            mcp: None,
        };
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.agent("claude").unwrap().name, "claude");
    }
}
