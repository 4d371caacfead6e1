// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI provider adapter for the Switchyard gateway.
//!
//! Request flags are only forwarded to models that accept them: reasoning
//! effort goes to `o*` and `gpt-5*` models, web search options to `*search*`
//! models. Everything else ignores them.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use switchyard_config::model::OpenAiConfig;
use switchyard_core::{
    AdapterType, GenerationRequest, HealthStatus, PluginAdapter, ProviderAdapter, ProviderKind,
    ProviderResult, SwitchyardError, TokenUsage,
};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ChatMessage, ChatRequest, WebSearchOptions};

pub struct OpenAiProvider {
    client: OpenAiClient,
    max_tokens: u32,
}

impl OpenAiProvider {
    /// Build from config. The API key comes from `openai.api_key` or
    /// `OPENAI_API_KEY`.
    pub fn new(config: &OpenAiConfig) -> Result<Self, SwitchyardError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = OpenAiClient::new(
            &api_key,
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        info!(base_url = %config.base_url, "OpenAI provider initialized");
        Ok(Self::with_client(client, config.max_tokens))
    }

    pub fn with_client(client: OpenAiClient, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }

    fn to_chat_request(&self, request: &GenerationRequest, model: &str) -> ChatRequest {
        let reasoning_effort =
            is_reasoning_model(model).then(|| request.reasoning_effort.to_string());

        let web_search_options = (request.wants_search() && is_search_model(model)).then(|| {
            WebSearchOptions {
                search_context_size: request.deep_research.then(|| "high".to_string()),
            }
        });

        ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            max_completion_tokens: self.max_tokens,
            reasoning_effort,
            web_search_options,
        }
    }
}

/// `o1`, `o3-mini`, `o4-mini`, `gpt-5`, ...
pub fn is_reasoning_model(model: &str) -> bool {
    let lower = model.to_ascii_lowercase();
    let o_series = lower
        .strip_prefix('o')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit());
    o_series || lower.starts_with("gpt-5")
}

/// `gpt-4o-search-preview`, `gpt-4o-mini-search-preview`, ...
pub fn is_search_model(model: &str) -> bool {
    model.to_ascii_lowercase().contains("search")
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
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
impl ProviderAdapter for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn invoke(
        &self,
        request: &GenerationRequest,
        model: &str,
    ) -> Result<ProviderResult, SwitchyardError> {
        let wire = self.to_chat_request(request, model);
        let response = self.client.chat(&wire).await?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            SwitchyardError::provider(ProviderKind::OpenAi, "response contained no choices")
        })?;
        debug!(id = %response.id, finish_reason = ?choice.finish_reason, "openai completion");

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(SwitchyardError::provider(
                ProviderKind::OpenAi,
                "response blocked by content filter",
            ));
        }
        if let Some(refusal) = choice.message.refusal.filter(|r| !r.is_empty()) {
            return Err(SwitchyardError::provider(
                ProviderKind::OpenAi,
                format!("model refused: {refusal}"),
            ));
        }

        let text = choice.message.content.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(SwitchyardError::provider(
                ProviderKind::OpenAi,
                "response contained no text",
            ));
        }

        let usage = response.usage.unwrap_or_default();
        Ok(ProviderResult {
            text,
            provider_used: ProviderKind::OpenAi.to_string(),
            model: if response.model.is_empty() {
                model.to_string()
            } else {
                response.model
            },
            usage: TokenUsage::new(usage.prompt_tokens, usage.completion_tokens),
        })
    }
}

fn resolve_api_key(config_key: Option<&str>) -> Result<SecretString, SwitchyardError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(SecretString::from(key.to_string()));
    }

    std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| {
            SwitchyardError::Config(
                "OpenAI API key not found. Set openai.api_key or OPENAI_API_KEY.".into(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_core::ReasoningEffort;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(uri: &str) -> OpenAiProvider {
        let client =
            OpenAiClient::new(&SecretString::from("k".to_string()), uri, Duration::from_secs(5))
                .unwrap();
        OpenAiProvider::with_client(client, 512)
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("Summarize the news", "tester").unwrap()
    }

    #[test]
    fn model_families() {
        assert!(is_reasoning_model("o1"));
        assert!(is_reasoning_model("o3-mini"));
        assert!(is_reasoning_model("GPT-5-mini"));
        assert!(!is_reasoning_model("gpt-4o"));
        assert!(!is_reasoning_model("omni-moderation"));
        assert!(is_search_model("gpt-4o-search-preview"));
        assert!(!is_search_model("gpt-4o"));
    }

    #[test]
    fn flags_are_dropped_for_plain_models() {
        let p = provider("http://unused");
        let req = request()
            .with_web_search(true)
            .with_reasoning_effort(ReasoningEffort::High);
        let wire = p.to_chat_request(&req, "gpt-4o");
        assert!(wire.reasoning_effort.is_none());
        assert!(wire.web_search_options.is_none());
        assert_eq!(wire.max_completion_tokens, 512);
    }

    #[test]
    fn reasoning_models_get_effort() {
        let p = provider("http://unused");
        let req = request().with_reasoning_effort(ReasoningEffort::High);
        assert_eq!(p.to_chat_request(&req, "o3-mini").reasoning_effort.as_deref(), Some("high"));
    }

    #[test]
    fn search_models_get_search_options() {
        let p = provider("http://unused");
        let plain = p.to_chat_request(&request().with_web_search(true), "gpt-4o-search-preview");
        assert_eq!(plain.web_search_options, Some(WebSearchOptions::default()));

        let deep = p.to_chat_request(&request().with_deep_research(true), "gpt-4o-search-preview");
        assert_eq!(
            deep.web_search_options
                .and_then(|o| o.search_context_size)
                .as_deref(),
            Some("high")
        );

        let none = p.to_chat_request(&request(), "gpt-4o-search-preview");
        assert!(none.web_search_options.is_none());
    }

    #[tokio::test]
    async fn invoke_parses_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "model": "gpt-4o-mini-2024-07-18",
                "choices": [{
                    "message": {"role": "assistant", "content": "Here it is"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 21, "completion_tokens": 9, "total_tokens": 30}
            })))
            .mount(&server)
            .await;

        let result = provider(&server.uri()).invoke(&request(), "gpt-4o-mini").await.unwrap();
        assert_eq!(result.text, "Here it is");
        assert_eq!(result.provider_used, "openai");
        assert_eq!(result.usage, TokenUsage::new(21, 9));
    }

    #[tokio::test]
    async fn content_filter_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {"role": "assistant", "content": ""},
                    "finish_reason": "content_filter"
                }]
            })))
            .mount(&server)
            .await;

        let err = provider(&server.uri()).invoke(&request(), "gpt-4o").await.unwrap_err();
        assert!(err.to_string().contains("content filter"), "got: {err}");
    }

    #[tokio::test]
    async fn empty_choices_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        assert!(provider(&server.uri()).invoke(&request(), "gpt-4o").await.is_err());
    }
}
