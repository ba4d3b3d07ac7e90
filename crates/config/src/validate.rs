// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shape and semantic validation for `config.yaml`.

use amux_core::Config;
use thiserror::Error;

const TOP_LEVEL_FIELDS: &[&str] = &["version", "agents", "mcp"];
const AGENT_FIELDS: &[&str] = &[
    "name",
    "runtime",
    "description",
    "environment",
    "workingDir",
    "tags",
    "runtimeOptions",
    "command",
];
const MCP_FIELDS: &[&str] = &["transport"];
const TRANSPORT_FIELDS: &[&str] = &["type", "addr"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("config document root must be a mapping")]
    NotAMapping,
    #[error("unsupported config field '{field}' at {location}")]
    UnknownField { location: String, field: String },
    #[error("unsupported config version '{0}', expected '1.0'")]
    UnsupportedVersion(String),
    #[error("agent id '{0}' must match [A-Za-z0-9_-]+")]
    InvalidAgentId(String),
}

/// Rejects any field not named in the documented shape, at every level of
/// the document. Type mismatches are left to serde deserialization.
pub fn check_shape(document: &serde_yaml::Value) -> Result<(), ValidationError> {
    let root = document.as_mapping().ok_or(ValidationError::NotAMapping)?;
    reject_unknown(root, TOP_LEVEL_FIELDS, "config")?;

    if let Some(agents) = root.get("agents").and_then(|v| v.as_mapping()) {
        for (id, agent) in agents {
            let id_str = id.as_str().unwrap_or("<non-string>");
            let agent_map = agent
                .as_mapping()
                .ok_or_else(|| ValidationError::UnknownField {
                    location: format!("agents.{id_str}"),
                    field: "<non-mapping agent>".to_string(),
                })?;
            reject_unknown(agent_map, AGENT_FIELDS, &format!("agents.{id_str}"))?;
        }
    }

    if let Some(mcp) = root.get("mcp").and_then(|v| v.as_mapping()) {
        reject_unknown(mcp, MCP_FIELDS, "mcp")?;
        if let Some(transport) = mcp.get("transport").and_then(|v| v.as_mapping()) {
            reject_unknown(transport, TRANSPORT_FIELDS, "mcp.transport")?;
        }
    }

    Ok(())
}

fn reject_unknown(map: &serde_yaml::Mapping, allowed: &[&str], location: &str) -> Result<(), ValidationError> {
    for key in map.keys() {
        let Some(key) = key.as_str() else { continue };
        if !allowed.contains(&key) {
            return Err(ValidationError::UnknownField {
                location: location.to_string(),
                field: key.to_string(),
            });
        }
    }
    Ok(())
}

/// Checks rules that only make sense once the document has deserialized
/// into typed `Config`: the declared version and agent id charset.
pub fn check_semantics(config: &Config) -> Result<(), ValidationError> {
    if config.version != Config::SUPPORTED_VERSION {
        return Err(ValidationError::UnsupportedVersion(config.version.clone()));
    }
    for id in config.agents.keys() {
        if !is_valid_agent_id(id) {
            return Err(ValidationError::InvalidAgentId(id.clone()));
        }
    }
    Ok(())
}

fn is_valid_agent_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
