use super::*;

fn parse_value(yaml: &str) -> serde_yaml::Value {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn accepts_minimal_valid_document() {
    let doc = parse_value(
        r#"
version: "1.0"
agents:
  claude:
    name: claude
    runtime: tmux
"#,
    );
    assert!(check_shape(&doc).is_ok());
}

#[test]
fn rejects_unknown_top_level_field() {
    let doc = parse_value(
        r#"
version: "1.0"
agents: {}
extra: true
"#,
    );
    let err = check_shape(&doc).unwrap_err();
    assert!(matches!(err, ValidationError::UnknownField { field, .. } if field == "extra"));
}

#[test]
fn rejects_unknown_agent_field() {
    let doc = parse_value(
        r#"
version: "1.0"
agents:
  claude:
    name: claude
    runtime: tmux
    nickname: bob
"#,
    );
    let err = check_shape(&doc).unwrap_err();
    assert!(matches!(err, ValidationError::UnknownField { field, .. } if field == "nickname"));
}

#[test]
fn rejects_unknown_mcp_and_transport_fields() {
    let doc = parse_value(
        r#"
version: "1.0"
agents: {}
mcp:
  transport:
    type: stdio
    port: 9999
"#,
    );
    let err = check_shape(&doc).unwrap_err();
    assert!(matches!(err, ValidationError::UnknownField { field, .. } if field == "port"));
}

#[test]
fn rejects_unsupported_version() {
    let config: Config = serde_yaml::from_str(
        r#"
version: "2.0"
agents: {}
"#,
    )
    .unwrap();
    let err = check_semantics(&config).unwrap_err();
    assert_eq!(err, ValidationError::UnsupportedVersion("2.0".to_string()));
}

#[test]
fn rejects_invalid_agent_id() {
    let config: Config = serde_yaml::from_str(
        r#"
version: "1.0"
agents:
  "bad id!":
    name: x
    runtime: local
"#,
    )
    .unwrap();
    let err = check_semantics(&config).unwrap_err();
    assert_eq!(err, ValidationError::InvalidAgentId("bad id!".to_string()));
}

#[test]
fn accepts_valid_agent_id_charset() {
    let config: Config = serde_yaml::from_str(
        r#"
version: "1.0"
agents:
  my-agent_1:
    name: x
    runtime: local
"#,
    )
    .unwrap();
    assert!(check_semantics(&config).is_ok());
}
