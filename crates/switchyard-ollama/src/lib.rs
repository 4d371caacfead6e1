// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama provider adapter for the Switchyard gateway.
//!
//! Medium and high reasoning effort turn on `think`. Ollama has no web
//! search, so search and deep research flags are ignored.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use switchyard_config::model::OllamaConfig;
use switchyard_core::{
    AdapterType, GenerationRequest, HealthStatus, PluginAdapter, ProviderAdapter, ProviderKind,
    ProviderResult, ReasoningEffort, SwitchyardError, TokenUsage,
};
use tracing::{debug, info};

use crate::client::OllamaClient;
use crate::types::{ChatMessage, ChatRequest};

pub struct OllamaProvider {
    client: OllamaClient,
}

impl OllamaProvider {
    pub fn new(config: &OllamaConfig) -> Result<Self, SwitchyardError> {
        let client = OllamaClient::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        info!(base_url = %config.base_url, "Ollama provider initialized");
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: OllamaClient) -> Self {
        Self { client }
    }

    fn to_chat_request(&self, request: &GenerationRequest, model: &str) -> ChatRequest {
        let think = match request.reasoning_effort {
            ReasoningEffort::Low => None,
            ReasoningEffort::Medium | ReasoningEffort::High => Some(true),
        };
        ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            stream: false,
            think,
        }
    }
}

#[async_trait]
impl PluginAdapter for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
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
impl ProviderAdapter for OllamaProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    async fn invoke(
        &self,
        request: &GenerationRequest,
        model: &str,
    ) -> Result<ProviderResult, SwitchyardError> {
        let wire = self.to_chat_request(request, model);
        let response = self.client.chat(&wire).await?;
        debug!(done = response.done, "ollama completion");

        let text = response.message.content;
        if text.trim().is_empty() {
            return Err(SwitchyardError::provider(
                ProviderKind::Ollama,
                "response contained no text",
            ));
        }

        Ok(ProviderResult {
            text,
            provider_used: ProviderKind::Ollama.to_string(),
            model: if response.model.is_empty() {
                model.to_string()
            } else {
                response.model
            },
            usage: TokenUsage::new(
                response.prompt_eval_count.unwrap_or(0),
                response.eval_count.unwrap_or(0),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(uri: &str) -> OllamaProvider {
        OllamaProvider::with_client(OllamaClient::new(uri, Duration::from_secs(5)).unwrap())
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("Hello there", "tester").unwrap()
    }

    #[test]
    fn effort_controls_think_and_search_is_ignored() {
        let p = provider("http://unused");
        let low = request()
            .with_reasoning_effort(ReasoningEffort::Low)
            .with_deep_research(true);
        let wire = p.to_chat_request(&low, "llama3.1:8b");
        assert_eq!(wire.think, None);
        assert!(!wire.stream);

        let json = serde_json::to_value(&wire).unwrap();
        assert!(json.get("think").is_none());
        assert!(json.get("web_search_options").is_none());

        let high = request().with_reasoning_effort(ReasoningEffort::High);
        assert_eq!(p.to_chat_request(&high, "qwen3").think, Some(true));
    }

    #[tokio::test]
    async fn invoke_reads_eval_counts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"model": "llama3.1:8b", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3.1:8b",
                "message": {"role": "assistant", "content": "General Kenobi"},
                "done": true,
                "prompt_eval_count": 26,
                "eval_count": 4
            })))
            .mount(&server)
            .await;

        let result = provider(&server.uri()).invoke(&request(), "llama3.1:8b").await.unwrap();
        assert_eq!(result.text, "General Kenobi");
        assert_eq!(result.provider_used, "ollama");
        assert_eq!(result.usage, TokenUsage::new(26, 4));
    }

    #[tokio::test]
    async fn missing_model_surfaces_ollama_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "model \"nope\" not found, try pulling it first"
            })))
            .mount(&server)
            .await;

        let err = provider(&server.uri()).invoke(&request(), "nope").await.unwrap_err();
        assert_eq!(err.http_status(), Some(404));
        assert!(err.to_string().contains("not found"), "got: {err}");
    }
}
