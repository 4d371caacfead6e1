// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with scripted replies, so
//! fallback behavior can be exercised without external API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use switchyard_core::{
    AdapterType, GenerationRequest, HealthStatus, PluginAdapter, ProviderAdapter, ProviderKind,
    ProviderResult, SwitchyardError, TokenUsage,
};

/// What a [`MockProvider`] does on one call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    Success { text: String, usage: TokenUsage },
    Failure {
        http_status: Option<u16>,
        message: String,
    },
    /// Never answers; only a timeout or cancellation ends the call.
    Hang,
}

impl MockReply {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success {
            text: text.into(),
            usage: TokenUsage::new(10, 20),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            http_status: None,
            message: message.into(),
        }
    }
}

/// A provider that answers from a FIFO script.
///
/// Once the script is empty every call gets the default reply.
pub struct MockProvider {
    kind: ProviderKind,
    script: Mutex<VecDeque<MockReply>>,
    default_reply: MockReply,
    calls: AtomicUsize,
    called: Notify,
    health: Mutex<HealthStatus>,
}

impl MockProvider {
    /// A provider that always answers "mock response".
    pub fn new(kind: ProviderKind) -> Self {
        Self::with_default(kind, MockReply::success("mock response"))
    }

    pub fn with_default(kind: ProviderKind, default_reply: MockReply) -> Self {
        Self {
            kind,
            script: Mutex::new(VecDeque::new()),
            default_reply,
            calls: AtomicUsize::new(0),
            called: Notify::new(),
            health: Mutex::new(HealthStatus::Healthy),
        }
    }

    pub fn succeeding(kind: ProviderKind, text: impl Into<String>) -> Self {
        Self::with_default(kind, MockReply::success(text))
    }

    pub fn succeeding_with_usage(
        kind: ProviderKind,
        text: impl Into<String>,
        usage: TokenUsage,
    ) -> Self {
        Self::with_default(
            kind,
            MockReply::Success {
                text: text.into(),
                usage,
            },
        )
    }

    pub fn failing(kind: ProviderKind, message: impl Into<String>) -> Self {
        Self::with_default(kind, MockReply::failure(message))
    }

    pub fn failing_with_status(
        kind: ProviderKind,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::with_default(
            kind,
            MockReply::Failure {
                http_status: Some(status),
                message: message.into(),
            },
        )
    }

    pub fn hanging(kind: ProviderKind) -> Self {
        Self::with_default(kind, MockReply::Hang)
    }

    /// Queue `reply` ahead of the default.
    pub async fn push_reply(&self, reply: MockReply) {
        self.script.lock().await.push_back(reply);
    }

    /// Status reported by subsequent health checks.
    pub async fn set_health(&self, status: HealthStatus) {
        *self.health.lock().await = status;
    }

    /// Number of `invoke` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Resolves once `invoke` has been entered (at least once since the last wait).
    pub async fn wait_for_call(&self) {
        self.called.notified().await;
    }

    async fn next_reply(&self) -> MockReply {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, SwitchyardError> {
        Ok(self.health.lock().await.clone())
    }

    async fn shutdown(&self) -> Result<(), SwitchyardError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn invoke(
        &self,
        _request: &GenerationRequest,
        model: &str,
    ) -> Result<ProviderResult, SwitchyardError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.next_reply().await;
        self.called.notify_one();

        match reply {
            MockReply::Success { text, usage } => Ok(ProviderResult {
                text,
                provider_used: self.kind.to_string(),
                model: model.to_string(),
                usage,
            }),
            MockReply::Failure {
                http_status: Some(status),
                message,
            } => Err(SwitchyardError::provider_status(self.kind, status, message)),
            MockReply::Failure {
                http_status: None,
                message,
            } => Err(SwitchyardError::provider(self.kind, message)),
            MockReply::Hang => std::future::pending().await,
        }
    }
}
