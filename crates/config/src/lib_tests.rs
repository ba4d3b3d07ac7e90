use super::*;
use std::path::Path;

#[test]
fn loads_a_valid_config_file() {
    let yaml = r#"
version: "1.0"
agents:
  claude:
    name: claude
    runtime: tmux
    command: ["claude"]
"#;
    let config = parse(yaml, Path::new("config.yaml")).unwrap();
    assert_eq!(config.agent("claude").unwrap().name, "claude");
}

#[test]
fn rejects_unknown_field_before_deserializing() {
    let yaml = r#"
version: "1.0"
agents: {}
bogus: 1
"#;
    let err = parse(yaml, Path::new("config.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(ValidationError::UnknownField { .. })));
}

#[test]
fn rejects_unparseable_yaml() {
    let yaml = "not: valid: yaml: at: all:";
    let err = parse(yaml, Path::new("config.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn load_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        r#"
version: "1.0"
agents:
  claude:
    name: claude
    runtime: local
"#,
    )
    .unwrap();

    let config = load(&path).unwrap();
    assert_eq!(config.agent("claude").unwrap().name, "claude");
}

#[test]
fn load_missing_file_is_io_error() {
    let err = load(Path::new("/nonexistent/config.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
