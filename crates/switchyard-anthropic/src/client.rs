// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! One request per call; retries are the orchestrator's business (it moves
//! on to the next candidate instead).

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use switchyard_core::{ProviderKind, SwitchyardError};
use tracing::debug;

use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

const KIND: ProviderKind = ProviderKind::Anthropic;

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnthropicClient {
    /// Build a client with auth headers and a whole-request timeout.
    pub fn new(
        api_key: &SecretString,
        api_version: &str,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SwitchyardError> {
        let mut key = HeaderValue::from_str(api_key.expose_secret())
            .map_err(|e| SwitchyardError::Config(format!("invalid Anthropic API key: {e}")))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(api_version).map_err(|e| {
                SwitchyardError::Config(format!("invalid Anthropic API version: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| SwitchyardError::provider_source(KIND, "failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one non-streaming request.
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, SwitchyardError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "anthropic response received");

        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Anthropic API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(SwitchyardError::provider_status(KIND, status.as_u16(), message));
        }

        serde_json::from_str(&body).map_err(|e| {
            SwitchyardError::provider_source(KIND, format!("malformed response body: {e}"), e)
        })
    }
}

fn transport_error(e: reqwest::Error) -> SwitchyardError {
    let message = if e.is_timeout() {
        "request timed out".to_string()
    } else {
        format!("HTTP request failed: {e}")
    };
    SwitchyardError::provider_source(KIND, message, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiMessage;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: &str, timeout: Duration) -> AnthropicClient {
        AnthropicClient::new(
            &SecretString::from("test-key".to_string()),
            "2023-06-01",
            uri,
            timeout,
        )
        .unwrap()
    }

    fn request() -> MessageRequest {
        MessageRequest {
            model: "claude-test".into(),
            max_tokens: 64,
            messages: vec![ApiMessage {
                role: "user".into(),
                content: "Hello".into(),
            }],
            thinking: None,
            tools: None,
        }
    }

    #[tokio::test]
    async fn sends_auth_headers_and_parses_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({"model": "claude-test"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "model": "claude-test",
                "content": [{"type": "text", "text": "Hi"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 4, "output_tokens": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client(&server.uri(), Duration::from_secs(5))
            .complete_message(&request())
            .await
            .unwrap();
        assert_eq!(resp.text(), "Hi");
        assert_eq!(resp.usage.input_tokens, 4);
    }

    #[tokio::test]
    async fn error_status_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_json(serde_json::json!({
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server.uri(), Duration::from_secs(5))
            .complete_message(&request())
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), Some(529));
        assert!(err.to_string().contains("overloaded_error"), "got: {err}");
    }

    #[tokio::test]
    async fn malformed_body_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server.uri(), Duration::from_secs(5))
            .complete_message(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, SwitchyardError::Provider { http_status: None, .. }));
        assert!(err.to_string().contains("malformed response body"));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let err = client(&server.uri(), Duration::from_millis(100))
            .complete_message(&request())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"), "got: {err}");
    }
}
