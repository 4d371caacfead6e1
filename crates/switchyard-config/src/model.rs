// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Switchyard gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use switchyard_core::{PricingEntry, ProviderKind};

/// Top-level Switchyard configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchyardConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP listener for the `serve` command.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Usage ledger and pricing storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Anthropic Messages API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// OpenAI Chat Completions API settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Local Ollama settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Agent profiles and fallback chains.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Pricing table seed and usage recorder settings.
    #[serde(default)]
    pub cost: CostConfig,

    /// Offline answer settings.
    #[serde(default)]
    pub fallback: FallbackConfig,
}

/// Service identity and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "switchyard".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8780
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("switchyard").join("usage.db"))
        .and_then(|p| p.to_str().map(str::to_string))
        .unwrap_or_else(|| "usage.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Disable to never register the adapter.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// API key. `None` falls back to `ANTHROPIC_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,

    /// Anthropic API version header.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP timeout for one call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_key: None,
            base_url: default_anthropic_base_url(),
            api_version: default_api_version(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// API key. `None` falls back to `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_key: None,
            base_url: default_openai_base_url(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

/// Local Ollama configuration. No API key.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_ollama_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_ollama_base_url() -> String {
    "http://127.0.0.1:11434/api/chat".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Agent profiles and their fallback chains.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Profile used when the request names no profile or an unknown one.
    #[serde(default = "default_profile_name")]
    pub default_profile: String,

    /// Hard upper bound on one provider attempt, enforced by the orchestrator.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Hand-curated candidate chains.
    #[serde(default = "default_profiles")]
    pub profiles: Vec<ProfileConfig>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_profile: default_profile_name(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            profiles: default_profiles(),
        }
    }
}

fn default_profile_name() -> String {
    "cloud-first".to_string()
}

fn default_attempt_timeout_secs() -> u64 {
    90
}

/// One routing profile: a primary candidate plus an ordered fallback list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Profile name, matched case-insensitively against the request preference.
    pub name: String,

    /// Logical agent identity recorded on every usage row of this chain.
    pub agent_id: String,

    /// Extra names that select this profile (e.g. a provider name).
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Priority-1 entry.
    pub primary: CandidateConfig,

    /// Fallback entries; sorted by ascending priority at load time.
    #[serde(default)]
    pub fallbacks: Vec<FallbackCandidateConfig>,
}

/// A `(provider, model)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateConfig {
    pub provider: ProviderKind,
    pub model: String,
}

/// A fallback `(provider, model)` pair with its priority (2 and up).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FallbackCandidateConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub priority: u32,
}

fn candidate(provider: ProviderKind, model: &str) -> CandidateConfig {
    CandidateConfig {
        provider,
        model: model.to_string(),
    }
}

fn fallback(provider: ProviderKind, model: &str, priority: u32) -> FallbackCandidateConfig {
    FallbackCandidateConfig {
        provider,
        model: model.to_string(),
        priority,
    }
}

/// Built-in profiles: cloud-first, openai-first, fast-local.
pub fn default_profiles() -> Vec<ProfileConfig> {
    vec![
        ProfileConfig {
            name: "cloud-first".to_string(),
            agent_id: "agent-cloud".to_string(),
            aliases: vec!["anthropic".to_string(), "cloud".to_string()],
            primary: candidate(ProviderKind::Anthropic, "claude-sonnet-4-20250514"),
            fallbacks: vec![
                fallback(ProviderKind::OpenAi, "gpt-4o", 2),
                fallback(ProviderKind::Ollama, "llama3.1:8b", 3),
            ],
        },
        ProfileConfig {
            name: "openai-first".to_string(),
            agent_id: "agent-openai".to_string(),
            aliases: vec!["openai".to_string()],
            primary: candidate(ProviderKind::OpenAi, "gpt-4o-mini"),
            fallbacks: vec![
                fallback(ProviderKind::Anthropic, "claude-haiku-4-5-20250901", 2),
                fallback(ProviderKind::Ollama, "llama3.1:8b", 3),
            ],
        },
        ProfileConfig {
            name: "fast-local".to_string(),
            agent_id: "agent-local".to_string(),
            aliases: vec!["ollama".to_string(), "local".to_string()],
            primary: candidate(ProviderKind::Ollama, "llama3.1:8b"),
            fallbacks: vec![
                fallback(ProviderKind::OpenAi, "gpt-4o-mini", 2),
                fallback(ProviderKind::Anthropic, "claude-haiku-4-5-20250901", 3),
            ],
        },
    ]
}

/// Pricing seed and usage recorder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    /// Capacity of the usage recorder queue. Records beyond it are dropped.
    #[serde(default = "default_usage_queue_capacity")]
    pub usage_queue_capacity: usize,

    /// Entries upserted into the pricing table at startup.
    #[serde(default = "default_pricing")]
    pub pricing: Vec<PricingConfig>,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            usage_queue_capacity: default_usage_queue_capacity(),
            pricing: default_pricing(),
        }
    }
}

fn default_usage_queue_capacity() -> usize {
    1024
}

/// Rates for one `(provider, model)` in USD per 1,000 tokens.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
}

impl PricingConfig {
    pub fn to_entry(&self) -> PricingEntry {
        PricingEntry {
            provider: self.provider.to_string(),
            model: self.model.clone(),
            input_cost_per_1k: self.input_cost_per_1k,
            output_cost_per_1k: self.output_cost_per_1k,
        }
    }
}

fn price(provider: ProviderKind, model: &str, input: f64, output: f64) -> PricingConfig {
    PricingConfig {
        provider,
        model: model.to_string(),
        input_cost_per_1k: input,
        output_cost_per_1k: output,
    }
}

/// Published list prices for the models used by the built-in profiles.
fn default_pricing() -> Vec<PricingConfig> {
    vec![
        price(ProviderKind::Anthropic, "claude-sonnet-4-20250514", 0.003, 0.015),
        price(ProviderKind::Anthropic, "claude-haiku-4-5-20250901", 0.001, 0.005),
        price(ProviderKind::OpenAi, "gpt-4o", 0.0025, 0.01),
        price(ProviderKind::OpenAi, "gpt-4o-mini", 0.00015, 0.0006),
        price(ProviderKind::Ollama, "llama3.1:8b", 0.0, 0.0),
    ]
}

/// Offline answer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FallbackConfig {
    /// Prompt characters echoed back in the offline answer.
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,

    /// Error characters shown in the offline answer and stored on usage rows.
    #[serde(default = "default_max_error_chars")]
    pub max_error_chars: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: default_max_prompt_chars(),
            max_error_chars: default_max_error_chars(),
        }
    }
}

fn default_max_prompt_chars() -> usize {
    500
}

fn default_max_error_chars() -> usize {
    300
}
