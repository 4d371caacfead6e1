// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for configuration loading and diagnostics.

use figment::Jail;
use switchyard_config::diagnostic::ConfigError;
use switchyard_config::{load_and_validate_str, load_config_from_path, load_config_from_str};
use switchyard_core::ProviderKind;

#[test]
fn full_document_deserializes() {
    let toml = r#"
[service]
name = "edge"
log_level = "debug"

[gateway]
host = "0.0.0.0"
port = 9100

[storage]
database_path = "/tmp/usage.db"
wal_mode = false

[anthropic]
api_key = "sk-ant-test"
max_tokens = 2048

[openai]
enabled = false

[ollama]
base_url = "http://gpu-box:11434/api/chat"

[routing]
default_profile = "local"
attempt_timeout_secs = 30

[[routing.profiles]]
name = "local"
agent_id = "agent-local"
aliases = ["ollama"]
primary = { provider = "ollama", model = "qwen2.5:7b" }
fallbacks = [
  { provider = "anthropic", model = "claude-haiku-4-5-20250901", priority = 2 },
]

[cost]
usage_queue_capacity = 16

[[cost.pricing]]
provider = "anthropic"
model = "claude-haiku-4-5-20250901"
input_cost_per_1k = 0.001
output_cost_per_1k = 0.005

[fallback]
max_prompt_chars = 120
"#;

    let config = load_and_validate_str(toml).expect("document should validate");
    assert_eq!(config.service.name, "edge");
    assert_eq!(config.gateway.port, 9100);
    assert!(!config.storage.wal_mode);
    assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-ant-test"));
    assert_eq!(config.anthropic.max_tokens, 2048);
    assert!(!config.openai.enabled);
    assert_eq!(config.ollama.base_url, "http://gpu-box:11434/api/chat");
    assert_eq!(config.routing.profiles.len(), 1);
    let profile = &config.routing.profiles[0];
    assert_eq!(profile.primary.provider, ProviderKind::Ollama);
    assert_eq!(profile.fallbacks[0].provider, ProviderKind::Anthropic);
    assert_eq!(config.cost.usage_queue_capacity, 16);
    assert_eq!(config.cost.pricing.len(), 1);
    assert_eq!(config.fallback.max_prompt_chars, 120);
    assert_eq!(config.fallback.max_error_chars, 300);
}

#[test]
fn empty_document_yields_builtin_profiles() {
    let config = load_and_validate_str("").expect("defaults should validate");
    let names: Vec<&str> = config
        .routing
        .profiles
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, ["cloud-first", "openai-first", "fast-local"]);
    assert_eq!(config.routing.default_profile, "cloud-first");

    let cloud = &config.routing.profiles[0];
    assert_eq!(cloud.primary.provider, ProviderKind::Anthropic);
    let order: Vec<ProviderKind> = cloud.fallbacks.iter().map(|f| f.provider).collect();
    assert_eq!(order, [ProviderKind::OpenAi, ProviderKind::Ollama]);
    assert!(!config.cost.pricing.is_empty());
}

#[test]
fn unknown_key_gets_suggestion_and_span() {
    let toml = "[gateway]\nprot = 9000\n";
    let errors = load_and_validate_str(toml).expect_err("unknown key should fail");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            span,
            ..
        } => {
            assert_eq!(key, "prot");
            assert_eq!(suggestion.as_deref(), Some("port"));
            assert!(span.is_some());
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn wrong_type_is_reported_with_path() {
    let errors = load_and_validate_str("[gateway]\nport = \"high\"\n").expect_err("should fail");
    match &errors[0] {
        ConfigError::InvalidType { key, .. } => assert_eq!(key, "gateway.port"),
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

#[test]
fn unknown_provider_is_rejected() {
    let toml = r#"
[[routing.profiles]]
name = "cloud-first"
agent_id = "a"
primary = { provider = "gemini", model = "x" }
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn validation_errors_are_collected() {
    let toml = r#"
[routing]
default_profile = "missing"
attempt_timeout_secs = 0

[cost]
usage_queue_capacity = 0
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 3);
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

#[test]
fn env_overrides_file_values() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            "[gateway]\nport = 9000\n\n[anthropic]\nmax_tokens = 1000\n",
        )?;
        jail.set_env("SWITCHYARD_GATEWAY_PORT", "9555");
        jail.set_env("SWITCHYARD_ANTHROPIC_API_KEY", "sk-from-env");
        jail.set_env("SWITCHYARD_ROUTING_ATTEMPT_TIMEOUT_SECS", "12");

        let config = load_config_from_path("custom.toml".as_ref())?;
        assert_eq!(config.gateway.port, 9555);
        assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-from-env"));
        assert_eq!(config.anthropic.max_tokens, 1000);
        assert_eq!(config.routing.attempt_timeout_secs, 12);
        Ok(())
    });
}
