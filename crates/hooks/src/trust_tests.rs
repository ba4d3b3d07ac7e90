use super::*;
use amux_core::{HookEvent, HookSpec};
use std::collections::HashMap;
use tempfile::tempdir;

fn sample_config() -> HookConfig {
    let mut config = HookConfig::new();
    config.insert(
        HookEvent::SessionStart,
        vec![HookSpec {
            name: "notify".to_string(),
            command: Some("echo hi".to_string()),
            script: None,
            timeout: std::time::Duration::from_secs(300),
            on_error: Default::default(),
            env: HashMap::new(),
        }],
    );
    config
}

#[test]
fn untrusted_config_is_not_trusted() {
    let dir = tempdir().unwrap();
    let store = TrustStore::new(dir.path().join(".hooks-trust.yaml"));
    assert!(!store.is_trusted(&sample_config()));
}

#[test]
fn trusting_the_current_hash_makes_it_trusted() {
    let dir = tempdir().unwrap();
    let store = TrustStore::new(dir.path().join(".hooks-trust.yaml"));
    let config = sample_config();
    let hash = hash_hook_config(&config).unwrap();
    store.trust(hash, "operator", 1000).unwrap();
    assert!(store.is_trusted(&config));
}

#[test]
fn editing_config_after_trust_invalidates_it() {
    let dir = tempdir().unwrap();
    let store = TrustStore::new(dir.path().join(".hooks-trust.yaml"));
    let mut config = sample_config();
    let hash = hash_hook_config(&config).unwrap();
    store.trust(hash, "operator", 1000).unwrap();

    config.get_mut(&HookEvent::SessionStart).unwrap()[0].command = Some("echo changed".to_string());
    assert!(!store.is_trusted(&config));
}
