// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a local Ollama server. No authentication.

use std::time::Duration;

use switchyard_core::{ProviderKind, SwitchyardError};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

const KIND: ProviderKind = ProviderKind::Ollama;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SwitchyardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SwitchyardError::provider_source(KIND, "failed to build HTTP client", e))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// One non-streaming chat call.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, SwitchyardError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "ollama response received");

        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!("Ollama error: {}", api_err.error),
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
    } else if e.is_connect() {
        format!("Ollama server unreachable: {e}")
    } else {
        format!("HTTP request failed: {e}")
    };
    SwitchyardError::provider_source(KIND, message, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    fn request() -> ChatRequest {
        ChatRequest {
            model: "llama3.1:8b".into(),
            messages: vec![ChatMessage {
                role: "user".into(),
                content: "hi".into(),
            }],
            stream: false,
            think: None,
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_a_provider_error() {
        // Port 9 (discard) is closed on test machines.
        let client =
            OllamaClient::new("http://127.0.0.1:9/api/chat", Duration::from_secs(2)).unwrap();
        let err = client.chat(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            SwitchyardError::Provider {
                provider: ProviderKind::Ollama,
                http_status: None,
                ..
            }
        ));
    }
}
