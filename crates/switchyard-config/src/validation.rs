// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.
//!
//! Every failing check is collected so the operator sees all problems at once.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{ProfileConfig, SwitchyardConfig};

/// Validate a deserialized configuration.
pub fn validate_config(config: &SwitchyardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    }

    for (key, value) in [
        ("anthropic.request_timeout_secs", config.anthropic.request_timeout_secs),
        ("openai.request_timeout_secs", config.openai.request_timeout_secs),
        ("ollama.request_timeout_secs", config.ollama.request_timeout_secs),
        ("routing.attempt_timeout_secs", config.routing.attempt_timeout_secs),
    ] {
        if value == 0 {
            errors.push(ConfigError::validation(format!("{key} must be greater than 0")));
        }
    }

    if config.anthropic.max_tokens == 0 {
        errors.push(ConfigError::validation("anthropic.max_tokens must be greater than 0"));
    }
    if config.openai.max_tokens == 0 {
        errors.push(ConfigError::validation("openai.max_tokens must be greater than 0"));
    }

    if config.cost.usage_queue_capacity == 0 {
        errors.push(ConfigError::validation(
            "cost.usage_queue_capacity must be greater than 0",
        ));
    }

    validate_routing(config, &mut errors);
    validate_pricing(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_routing(config: &SwitchyardConfig, errors: &mut Vec<ConfigError>) {
    let routing = &config.routing;

    if routing.profiles.is_empty() {
        errors.push(ConfigError::validation(
            "routing.profiles must contain at least one profile",
        ));
    }

    let default = routing.default_profile.to_lowercase();
    if !routing
        .profiles
        .iter()
        .any(|p| p.name.to_lowercase() == default)
    {
        errors.push(ConfigError::validation(format!(
            "routing.default_profile `{}` does not name a configured profile",
            routing.default_profile
        )));
    }

    // Names and aliases share one case-insensitive namespace.
    let mut seen = HashSet::new();
    for profile in &routing.profiles {
        for name in std::iter::once(&profile.name).chain(&profile.aliases) {
            if name.trim().is_empty() {
                errors.push(ConfigError::validation(format!(
                    "routing profile `{}` has an empty name or alias",
                    profile.name
                )));
            } else if !seen.insert(name.to_lowercase()) {
                errors.push(ConfigError::validation(format!(
                    "routing name or alias `{name}` is used more than once"
                )));
            }
        }
        validate_profile(profile, errors);
    }
}

fn validate_profile(profile: &ProfileConfig, errors: &mut Vec<ConfigError>) {
    let name = &profile.name;

    if profile.agent_id.trim().is_empty() {
        errors.push(ConfigError::validation(format!(
            "routing profile `{name}`: agent_id must not be empty"
        )));
    }

    if profile.primary.model.trim().is_empty() {
        errors.push(ConfigError::validation(format!(
            "routing profile `{name}`: primary model must not be empty"
        )));
    }

    let mut priorities = HashSet::new();
    for fallback in &profile.fallbacks {
        if fallback.model.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "routing profile `{name}`: fallback model for {} must not be empty",
                fallback.provider
            )));
        }
        if fallback.priority < 2 {
            errors.push(ConfigError::validation(format!(
                "routing profile `{name}`: fallback priority must be at least 2, got {}",
                fallback.priority
            )));
        }
        if !priorities.insert(fallback.priority) {
            errors.push(ConfigError::validation(format!(
                "routing profile `{name}`: fallback priority {} is used more than once",
                fallback.priority
            )));
        }
    }
}

fn validate_pricing(config: &SwitchyardConfig, errors: &mut Vec<ConfigError>) {
    for entry in &config.cost.pricing {
        let label = format!("{}/{}", entry.provider, entry.model);
        if entry.model.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "cost.pricing entry for {} has an empty model",
                entry.provider
            )));
        }
        for (field, rate) in [
            ("input_cost_per_1k", entry.input_cost_per_1k),
            ("output_cost_per_1k", entry.output_cost_per_1k),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                errors.push(ConfigError::validation(format!(
                    "cost.pricing {label}: {field} must be a non-negative number, got {rate}"
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FallbackCandidateConfig;
    use switchyard_core::ProviderKind;

    fn messages(config: &SwitchyardConfig) -> Vec<String> {
        match validate_config(config) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&SwitchyardConfig::default()).is_ok());
    }

    #[test]
    fn unknown_default_profile_is_rejected() {
        let mut config = SwitchyardConfig::default();
        config.routing.default_profile = "nope".into();
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("routing.default_profile"));
    }

    #[test]
    fn default_profile_match_ignores_case() {
        let mut config = SwitchyardConfig::default();
        config.routing.default_profile = "Fast-Local".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn alias_colliding_with_profile_name_is_rejected() {
        let mut config = SwitchyardConfig::default();
        config.routing.profiles[1].aliases.push("Cloud-First".into());
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("used more than once")));
    }

    #[test]
    fn bad_priorities_are_all_reported() {
        let mut config = SwitchyardConfig::default();
        config.routing.profiles[0].fallbacks = vec![
            FallbackCandidateConfig {
                provider: ProviderKind::OpenAi,
                model: "gpt-4o".into(),
                priority: 1,
            },
            FallbackCandidateConfig {
                provider: ProviderKind::Ollama,
                model: "llama3.1:8b".into(),
                priority: 1,
            },
        ];
        let msgs = messages(&config);
        assert_eq!(msgs.iter().filter(|m| m.contains("at least 2")).count(), 2);
        assert_eq!(msgs.iter().filter(|m| m.contains("priority 1 is used")).count(), 1);
    }

    #[test]
    fn zero_values_collect_multiple_errors() {
        let mut config = SwitchyardConfig::default();
        config.routing.attempt_timeout_secs = 0;
        config.cost.usage_queue_capacity = 0;
        config.storage.database_path = "  ".into();
        assert_eq!(messages(&config).len(), 3);
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut config = SwitchyardConfig::default();
        config.cost.pricing[0].output_cost_per_1k = -0.5;
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("output_cost_per_1k"));
    }
}
