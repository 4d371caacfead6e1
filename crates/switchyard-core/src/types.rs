// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the router, adapters, orchestrator, and storage.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::SwitchyardError;

/// `provider_used` value reported when every live provider failed.
pub const STATIC_FALLBACK_PROVIDER: &str = "static-fallback";

/// Provider column written on the usage row of a static fallback.
pub const STATIC_USAGE_PROVIDER: &str = "static";

/// Model column written on the usage row of a static fallback.
pub const STATIC_USAGE_MODEL: &str = "static-fallback";

/// Timestamp layout used for every persisted `created_at`.
///
/// Fixed-width so that lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Format a UTC instant using [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Current time formatted with [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
}

/// The external AI providers the gateway can call.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Anthropic Messages API.
    Anthropic,
    /// OpenAI Chat Completions API.
    OpenAi,
    /// Ollama running locally.
    Ollama,
}

/// How hard the model should think before answering.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    #[default]
    Medium,
    High,
}

/// A validated "generate text" request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// The user prompt. Must not be blank.
    pub prompt: String,
    /// Allow the provider to search the web.
    #[serde(default)]
    pub web_search: bool,
    /// Ask for a longer, multi-source answer. Implies web search where supported.
    #[serde(default)]
    pub deep_research: bool,
    /// Requested reasoning effort.
    #[serde(default)]
    pub reasoning_effort: ReasoningEffort,
    /// Routing profile name or provider alias. `None` selects the default profile.
    #[serde(default)]
    pub preferred_provider: Option<String>,
    /// Identity of the caller, used for usage accounting.
    pub caller_id: String,
}

impl GenerationRequest {
    /// Build a request with default flags, validating prompt and caller.
    pub fn new(
        prompt: impl Into<String>,
        caller_id: impl Into<String>,
    ) -> Result<Self, SwitchyardError> {
        let request = Self {
            prompt: prompt.into(),
            web_search: false,
            deep_research: false,
            reasoning_effort: ReasoningEffort::default(),
            preferred_provider: None,
            caller_id: caller_id.into(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn with_preferred_provider(mut self, preferred: impl Into<String>) -> Self {
        self.preferred_provider = Some(preferred.into());
        self
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    pub fn with_deep_research(mut self, enabled: bool) -> Self {
        self.deep_research = enabled;
        self
    }

    pub fn with_reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = effort;
        self
    }

    /// Check the invariants every request must satisfy before it reaches a provider.
    pub fn validate(&self) -> Result<(), SwitchyardError> {
        if self.prompt.trim().is_empty() {
            return Err(SwitchyardError::Validation(
                "prompt must not be empty".to_string(),
            ));
        }
        if self.caller_id.trim().is_empty() {
            return Err(SwitchyardError::Validation(
                "caller_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether any form of web search was requested.
    pub fn wants_search(&self) -> bool {
        self.web_search || self.deep_research
    }
}

/// Token counts reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }
}

/// Canonical result of a successful adapter call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    /// Generated text.
    pub text: String,
    /// Identity of the provider that answered (e.g. "anthropic").
    pub provider_used: String,
    /// Model reported by the provider, falling back to the requested one.
    pub model: String,
    /// Token usage parsed from the provider response.
    pub usage: TokenUsage,
}

/// The externally visible result of a `generate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub text: String,
    /// True whenever the answer did not come from the chain's primary entry.
    pub fallback_used: bool,
    pub provider_used: String,
}

impl GenerationOutcome {
    /// Whether every live provider failed and the offline answer was returned.
    pub fn is_static_fallback(&self) -> bool {
        self.provider_used == STATIC_FALLBACK_PROVIDER
    }
}

/// Outcome of a single attempt, as stored in the usage ledger.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UsageStatus {
    Success,
    Failed,
    /// The caller disconnected while this attempt was in flight.
    Cancelled,
}

/// One append-only ledger entry per attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Unique record identifier (UUID v4).
    pub id: String,
    pub caller_id: String,
    pub agent_id: String,
    pub provider: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost_usd: f64,
    pub latency_ms: u64,
    pub status: UsageStatus,
    pub error_message: Option<String>,
    /// Timestamp in [`TIMESTAMP_FORMAT`].
    pub created_at: String,
}

impl UsageRecord {
    /// Create a record with zero tokens, zero cost, and zero latency.
    pub fn new(
        caller_id: impl Into<String>,
        agent_id: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
        status: UsageStatus,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            caller_id: caller_id.into(),
            agent_id: agent_id.into(),
            provider: provider.into(),
            model: model.into(),
            input_tokens: 0,
            output_tokens: 0,
            cost_usd: 0.0,
            latency_ms: 0,
            status,
            error_message: None,
            created_at: timestamp_now(),
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage, cost_usd: f64) -> Self {
        self.input_tokens = usage.input_tokens;
        self.output_tokens = usage.output_tokens;
        self.cost_usd = cost_usd;
        self
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn total_tokens(&self) -> u64 {
        u64::from(self.input_tokens) + u64::from(self.output_tokens)
    }
}

/// Per-provider-per-model rates in USD per 1,000 tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    pub provider: String,
    pub model: String,
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
}

/// Half-open time window `[since, until)` used by usage queries.
///
/// A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn all_time() -> Self {
        Self::default()
    }

    pub fn between(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            since: Some(since),
            until: Some(until),
        }
    }

    /// The trailing `days` days up to now.
    ///
    /// A window reaching past the earliest representable instant has no
    /// lower bound.
    pub fn last_days(days: u32) -> Self {
        let since = Utc::now().checked_sub_signed(Duration::days(i64::from(days)));
        Self { since, until: None }
    }

    /// Lower bound formatted for comparison against stored timestamps.
    pub fn since_str(&self) -> Option<String> {
        self.since.map(format_timestamp)
    }

    /// Upper bound formatted for comparison against stored timestamps.
    pub fn until_str(&self) -> Option<String> {
        self.until.map(format_timestamp)
    }

    /// Whether a stored timestamp falls inside the range.
    pub fn contains(&self, created_at: &str) -> bool {
        let after_start = self
            .since_str()
            .is_none_or(|since| created_at >= since.as_str());
        let before_end = self
            .until_str()
            .is_none_or(|until| created_at < until.as_str());
        after_start && before_end
    }
}

/// Usage totals for one caller, grouped by provider and agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageAggregate {
    pub provider: String,
    pub agent_id: String,
    pub total_tokens: u64,
    pub total_cost_usd: f64,
    pub count: u64,
}

/// Latency and cost profile of one agent, grouped by provider and model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAggregate {
    pub provider: String,
    pub model: String,
    pub avg_latency_ms: f64,
    pub avg_cost_usd: f64,
    /// Attempt count keyed by status name ("success", "failed", "cancelled").
    pub count_by_status: BTreeMap<String, u64>,
}

impl PerformanceAggregate {
    pub fn total_count(&self) -> u64 {
        self.count_by_status.values().sum()
    }
}
