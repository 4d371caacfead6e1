// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI Chat Completions API.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use switchyard_core::{ProviderKind, SwitchyardError};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

const KIND: ProviderKind = ProviderKind::OpenAi;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: &SecretString,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SwitchyardError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| SwitchyardError::Config(format!("invalid OpenAI API key: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

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

    /// One chat completion, no retries.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, SwitchyardError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "openai response received");

        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => match api_err.error.type_ {
                    Some(kind) => format!("OpenAI API error ({kind}): {}", api_err.error.message),
                    None => format!("OpenAI API error: {}", api_err.error.message),
                },
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
