// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic provider adapter for the Switchyard gateway.
//!
//! Maps the canonical request onto the Messages API:
//! - medium/high reasoning effort enables extended thinking
//! - web search and deep research attach the server web-search tool
//! - a `refusal` stop reason is reported as a content-safety failure

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use switchyard_config::model::AnthropicConfig;
use switchyard_core::{
    AdapterType, GenerationRequest, HealthStatus, PluginAdapter, ProviderAdapter, ProviderKind,
    ProviderResult, ReasoningEffort, SwitchyardError, TokenUsage,
};
use tracing::{debug, info};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest, ServerTool, ThinkingConfig};

/// Thinking budget for medium effort.
pub const MEDIUM_THINKING_BUDGET: u32 = 2048;
/// Thinking budget for high effort.
pub const HIGH_THINKING_BUDGET: u32 = 8192;
/// Room left for the visible answer once thinking is enabled.
const ANSWER_HEADROOM: u32 = 1024;

const WEB_SEARCH_MAX_USES: u32 = 3;
const DEEP_RESEARCH_MAX_USES: u32 = 10;

pub struct AnthropicProvider {
    client: AnthropicClient,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Build from config. The API key comes from `anthropic.api_key` or
    /// `ANTHROPIC_API_KEY`.
    pub fn new(config: &AnthropicConfig) -> Result<Self, SwitchyardError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = AnthropicClient::new(
            &api_key,
            &config.api_version,
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        info!(base_url = %config.base_url, "Anthropic provider initialized");
        Ok(Self::with_client(client, config.max_tokens))
    }

    pub fn with_client(client: AnthropicClient, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }

    fn to_message_request(&self, request: &GenerationRequest, model: &str) -> MessageRequest {
        let budget = match request.reasoning_effort {
            ReasoningEffort::Low => None,
            ReasoningEffort::Medium => Some(MEDIUM_THINKING_BUDGET),
            ReasoningEffort::High => Some(HIGH_THINKING_BUDGET),
        };
        let max_tokens = match budget {
            Some(b) => self.max_tokens.max(b + ANSWER_HEADROOM),
            None => self.max_tokens,
        };

        let tools = request.wants_search().then(|| {
            let max_uses = if request.deep_research {
                DEEP_RESEARCH_MAX_USES
            } else {
                WEB_SEARCH_MAX_USES
            };
            vec![ServerTool::web_search(max_uses)]
        });

        MessageRequest {
            model: model.to_string(),
            max_tokens,
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            thinking: budget.map(ThinkingConfig::enabled),
            tools,
        }
    }
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, SwitchyardError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SwitchyardError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn invoke(
        &self,
        request: &GenerationRequest,
        model: &str,
    ) -> Result<ProviderResult, SwitchyardError> {
        let wire = self.to_message_request(request, model);
        let response = self.client.complete_message(&wire).await?;
        debug!(id = %response.id, stop_reason = ?response.stop_reason, "anthropic completion");

        if response.stop_reason.as_deref() == Some("refusal") {
            return Err(SwitchyardError::provider(
                ProviderKind::Anthropic,
                "response refused by content-safety filter",
            ));
        }

        let text = response.text();
        if text.trim().is_empty() {
            return Err(SwitchyardError::provider(
                ProviderKind::Anthropic,
                "response contained no text",
            ));
        }

        Ok(ProviderResult {
            text,
            provider_used: ProviderKind::Anthropic.to_string(),
            model: if response.model.is_empty() {
                model.to_string()
            } else {
                response.model
            },
            usage: TokenUsage::new(response.usage.input_tokens, response.usage.output_tokens),
        })
    }
}

fn resolve_api_key(config_key: Option<&str>) -> Result<SecretString, SwitchyardError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(SecretString::from(key.to_string()));
    }

    std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| {
            SwitchyardError::Config(
                "Anthropic API key not found. Set anthropic.api_key or ANTHROPIC_API_KEY.".into(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(uri: &str) -> AnthropicProvider {
        let client = AnthropicClient::new(
            &SecretString::from("k".to_string()),
            "2023-06-01",
            uri,
            Duration::from_secs(5),
        )
        .unwrap();
        AnthropicProvider::with_client(client, 1024)
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("Explain borrowing", "tester").unwrap()
    }

    #[test]
    fn low_effort_without_search_is_plain() {
        let p = provider("http://unused");
        let wire = p.to_message_request(
            &request().with_reasoning_effort(ReasoningEffort::Low),
            "claude-x",
        );
        assert!(wire.thinking.is_none());
        assert!(wire.tools.is_none());
        assert_eq!(wire.max_tokens, 1024);
        assert_eq!(wire.model, "claude-x");
    }

    #[test]
    fn effort_maps_to_thinking_budget_above_max_tokens() {
        let p = provider("http://unused");
        let medium = p.to_message_request(&request(), "m");
        assert_eq!(medium.thinking, Some(ThinkingConfig::enabled(MEDIUM_THINKING_BUDGET)));
        assert!(medium.max_tokens > MEDIUM_THINKING_BUDGET);

        let high =
            p.to_message_request(&request().with_reasoning_effort(ReasoningEffort::High), "m");
        assert_eq!(high.thinking, Some(ThinkingConfig::enabled(HIGH_THINKING_BUDGET)));
        assert!(high.max_tokens > HIGH_THINKING_BUDGET);
    }

    #[test]
    fn search_flags_attach_web_search_tool() {
        let p = provider("http://unused");
        let search = p.to_message_request(&request().with_web_search(true), "m");
        assert_eq!(search.tools, Some(vec![ServerTool::web_search(3)]));

        let deep = p.to_message_request(&request().with_deep_research(true), "m");
        assert_eq!(deep.tools, Some(vec![ServerTool::web_search(10)]));
    }

    #[tokio::test]
    async fn invoke_returns_canonical_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-x",
                "messages": [{"role": "user", "content": "Explain borrowing"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "model": "claude-x-20250101",
                "content": [{"type": "text", "text": "Borrowing lets you..."}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 12, "output_tokens": 30}
            })))
            .mount(&server)
            .await;

        let result = provider(&server.uri()).invoke(&request(), "claude-x").await.unwrap();
        assert_eq!(result.text, "Borrowing lets you...");
        assert_eq!(result.provider_used, "anthropic");
        assert_eq!(result.model, "claude-x-20250101");
        assert_eq!(result.usage, TokenUsage::new(12, 30));
    }

    #[tokio::test]
    async fn refusal_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_2",
                "model": "claude-x",
                "content": [],
                "stop_reason": "refusal",
                "usage": {"input_tokens": 12, "output_tokens": 0}
            })))
            .mount(&server)
            .await;

        let err = provider(&server.uri()).invoke(&request(), "claude-x").await.unwrap_err();
        assert!(matches!(
            err,
            SwitchyardError::Provider {
                provider: ProviderKind::Anthropic,
                ..
            }
        ));
        assert!(err.to_string().contains("content-safety"));
    }

    #[test]
    fn configured_key_wins() {
        let key = resolve_api_key(Some("sk-config")).unwrap();
        assert_eq!(key.expose_secret(), "sk-config");
    }

    #[test]
    fn missing_key_mentions_env_var() {
        // Only meaningful when the variable is unset in the test environment.
        if std::env::var("ANTHROPIC_API_KEY").is_err() {
            let err = resolve_api_key(None).unwrap_err().to_string();
            assert!(err.contains("ANTHROPIC_API_KEY"), "got: {err}");
        }
    }
}
