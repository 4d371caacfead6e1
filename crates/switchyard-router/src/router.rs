// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile resolution.
//!
//! Chains are built once from configuration. Lookup is by profile name or
//! alias, case-insensitive; anything else resolves to the default profile.

use std::collections::HashMap;

use switchyard_config::model::RoutingConfig;
use switchyard_core::SwitchyardError;
use tracing::debug;

use crate::chain::{Candidate, CandidateChain};

/// Maps a provider preference to a fixed candidate chain.
#[derive(Debug, Clone)]
pub struct AgentRouter {
    chains: Vec<CandidateChain>,
    by_name: HashMap<String, usize>,
    default_index: usize,
}

impl AgentRouter {
    /// Build every profile's chain from configuration.
    pub fn from_config(config: &RoutingConfig) -> Result<Self, SwitchyardError> {
        let mut chains = Vec::with_capacity(config.profiles.len());
        let mut by_name = HashMap::new();

        for (index, profile) in config.profiles.iter().enumerate() {
            let fallbacks = profile
                .fallbacks
                .iter()
                .map(|f| Candidate::new(f.provider, f.model.clone(), f.priority));
            chains.push(CandidateChain::new(
                profile.name.clone(),
                profile.agent_id.clone(),
                (profile.primary.provider, profile.primary.model.clone()),
                fallbacks,
            ));

            for name in std::iter::once(&profile.name).chain(&profile.aliases) {
                if by_name.insert(name.to_lowercase(), index).is_some() {
                    return Err(SwitchyardError::Config(format!(
                        "routing name or alias `{name}` is used more than once"
                    )));
                }
            }
        }

        let default_index = by_name
            .get(&config.default_profile.to_lowercase())
            .copied()
            .ok_or_else(|| {
                SwitchyardError::Config(format!(
                    "default routing profile `{}` is not configured",
                    config.default_profile
                ))
            })?;

        Ok(Self {
            chains,
            by_name,
            default_index,
        })
    }

    /// Chain for `preferred`, or the default chain when it is absent or unknown.
    pub fn resolve(&self, preferred: Option<&str>) -> &CandidateChain {
        let found = preferred
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .and_then(|p| {
                let hit = self.by_name.get(&p).copied();
                if hit.is_none() {
                    debug!(preference = %p, "unknown routing profile; using default");
                }
                hit
            });
        &self.chains[found.unwrap_or(self.default_index)]
    }

    pub fn default_chain(&self) -> &CandidateChain {
        &self.chains[self.default_index]
    }

    pub fn chains(&self) -> &[CandidateChain] {
        &self.chains
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_config::model::{CandidateConfig, ProfileConfig};
    use switchyard_core::ProviderKind;

    fn router() -> AgentRouter {
        AgentRouter::from_config(&RoutingConfig::default()).unwrap()
    }

    fn providers(chain: &CandidateChain) -> Vec<ProviderKind> {
        chain.iter().map(|c| c.provider).collect()
    }

    #[test]
    fn default_profiles_resolve_in_curated_order() {
        let r = router();
        assert_eq!(
            providers(r.resolve(Some("cloud-first"))),
            [ProviderKind::Anthropic, ProviderKind::OpenAi, ProviderKind::Ollama]
        );
        assert_eq!(
            providers(r.resolve(Some("openai"))),
            [ProviderKind::OpenAi, ProviderKind::Anthropic, ProviderKind::Ollama]
        );
        assert_eq!(
            providers(r.resolve(Some("LOCAL"))),
            [ProviderKind::Ollama, ProviderKind::OpenAi, ProviderKind::Anthropic]
        );
    }

    #[test]
    fn missing_or_unknown_preference_uses_default() {
        let r = router();
        assert_eq!(r.resolve(None).profile(), "cloud-first");
        assert_eq!(r.resolve(Some("")).profile(), "cloud-first");
        assert_eq!(r.resolve(Some("gemini")).profile(), "cloud-first");
    }

    #[test]
    fn resolution_is_deterministic() {
        let r = router();
        assert_eq!(r.resolve(Some("ollama")), r.resolve(Some("ollama")));
    }

    #[test]
    fn missing_default_is_a_config_error() {
        let config = RoutingConfig {
            default_profile: "nope".into(),
            ..RoutingConfig::default()
        };
        assert!(matches!(
            AgentRouter::from_config(&config),
            Err(SwitchyardError::Config(_))
        ));
    }

    #[test]
    fn empty_profile_list_is_a_config_error() {
        let config = RoutingConfig {
            profiles: Vec::new(),
            ..RoutingConfig::default()
        };
        assert!(AgentRouter::from_config(&config).is_err());
    }

    #[test]
    fn primary_only_profile_is_allowed() {
        let config = RoutingConfig {
            default_profile: "solo".into(),
            attempt_timeout_secs: 5,
            profiles: vec![ProfileConfig {
                name: "solo".into(),
                agent_id: "agent-solo".into(),
                aliases: vec![],
                primary: CandidateConfig {
                    provider: ProviderKind::Ollama,
                    model: "m".into(),
                },
                fallbacks: vec![],
            }],
        };
        let r = AgentRouter::from_config(&config).unwrap();
        assert_eq!(r.resolve(Some("anything")).len(), 1);
        assert_eq!(r.default_chain().agent_id(), "agent-solo");
    }
}
