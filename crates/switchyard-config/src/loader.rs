// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `/etc/switchyard/switchyard.toml`, then
//! `~/.config/switchyard/switchyard.toml`, then `./switchyard.toml`, then
//! `SWITCHYARD_*` environment variables. Later layers override earlier ones.

// figment::Error is external and cannot be boxed without a wrapper.
#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SwitchyardConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/switchyard/switchyard.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "switchyard.toml";

/// Top-level sections that environment variables may target.
const ENV_SECTIONS: &[&str] = &[
    "service", "gateway", "storage", "anthropic", "openai", "ollama", "routing", "cost",
    "fallback",
];

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("switchyard").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<SwitchyardConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML document over the compiled defaults.
///
/// Environment variables are ignored so tests stay hermetic.
pub fn load_config_from_str(toml_content: &str) -> Result<SwitchyardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SwitchyardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The unextracted Figment for the standard hierarchy.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// `SWITCHYARD_<SECTION>_<KEY>` maps to `<section>.<key>`.
///
/// Only the first underscore after the section name is a separator, so
/// `SWITCHYARD_ANTHROPIC_API_KEY` becomes `anthropic.api_key`.
fn env_provider() -> Env {
    Env::prefixed("SWITCHYARD_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key to a dotted config path.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
            .filter(|r| !r.is_empty())
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("anthropic_api_key"), "anthropic.api_key");
        assert_eq!(map_env_key("gateway_port"), "gateway.port");
        assert_eq!(
            map_env_key("routing_attempt_timeout_secs"),
            "routing.attempt_timeout_secs"
        );
        assert_eq!(map_env_key("cost_usage_queue_capacity"), "cost.usage_queue_capacity");
    }

    #[test]
    fn unknown_section_passes_through() {
        assert_eq!(map_env_key("nonsense_key"), "nonsense_key");
        assert_eq!(map_env_key("storage_"), "storage_");
    }
}
