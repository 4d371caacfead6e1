// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end orchestration tests.
//!
//! `TestHarness` wires a [`FallbackOrchestrator`] from mock providers and
//! in-memory stores, using the default routing table unless told otherwise.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use switchyard_agent::FallbackOrchestrator;
use switchyard_config::SwitchyardConfig;
use switchyard_core::{
    GenerationOutcome, GenerationRequest, PricingEntry, ProviderAdapter, ProviderKind,
    SwitchyardError, UsageRecord, UsageStore,
};
use switchyard_cost::{CostCalculator, UsageRecorder};
use tokio::task::JoinHandle;

use crate::memory_store::{MemoryPricingStore, MemoryUsageStore};
use crate::mock_provider::MockProvider;

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    config: SwitchyardConfig,
    providers: Vec<MockProvider>,
    pricing: Option<Vec<PricingEntry>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = SwitchyardConfig::default();
        config.routing.attempt_timeout_secs = 5;
        Self {
            config,
            providers: Vec::new(),
            pricing: None,
        }
    }

    /// Start from a custom configuration (routing table, limits, pricing).
    pub fn with_config(mut self, config: SwitchyardConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a mock adapter. A later provider of the same kind wins.
    pub fn with_provider(mut self, provider: MockProvider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Register one mock per provider kind, all failing with `message`.
    pub fn with_all_failing(self, message: &str) -> Self {
        [ProviderKind::Anthropic, ProviderKind::OpenAi, ProviderKind::Ollama]
            .into_iter()
            .fold(self, |builder, kind| {
                builder.with_provider(MockProvider::failing(kind, message))
            })
    }

    /// Use these pricing entries instead of the configured ones.
    pub fn with_pricing(mut self, entries: Vec<PricingEntry>) -> Self {
        self.pricing = Some(entries);
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.config.routing.attempt_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Build the harness. Must run inside a Tokio runtime.
    pub fn build(self) -> Result<TestHarness, SwitchyardError> {
        let pricing = self.pricing.unwrap_or_else(|| {
            self.config
                .cost
                .pricing
                .iter()
                .map(|p| p.to_entry())
                .collect()
        });
        let pricing_store = Arc::new(MemoryPricingStore::new(pricing));
        let usage_store = Arc::new(MemoryUsageStore::new());

        let costs = Arc::new(CostCalculator::new(pricing_store.clone()));
        let store: Arc<dyn UsageStore> = usage_store.clone();
        let (recorder, writer) = UsageRecorder::spawn(store, self.config.cost.usage_queue_capacity);

        let mut orchestrator = FallbackOrchestrator::from_config(&self.config, costs, recorder)?;
        let mut providers = BTreeMap::new();
        for provider in self.providers {
            let provider = Arc::new(provider);
            orchestrator = orchestrator.with_adapter(provider.clone());
            providers.insert(provider.kind(), provider);
        }

        Ok(TestHarness {
            orchestrator: Arc::new(orchestrator),
            usage: usage_store,
            pricing: pricing_store,
            providers,
            _writer: writer,
        })
    }
}

/// A fully wired orchestrator backed by mocks.
pub struct TestHarness {
    orchestrator: Arc<FallbackOrchestrator>,
    usage: Arc<MemoryUsageStore>,
    pricing: Arc<MemoryPricingStore>,
    providers: BTreeMap<ProviderKind, Arc<MockProvider>>,
    _writer: JoinHandle<()>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn orchestrator(&self) -> &Arc<FallbackOrchestrator> {
        &self.orchestrator
    }

    pub fn usage_store(&self) -> &Arc<MemoryUsageStore> {
        &self.usage
    }

    pub fn pricing_store(&self) -> &Arc<MemoryPricingStore> {
        &self.pricing
    }

    /// The mock registered for `kind`, if any.
    pub fn provider(&self, kind: ProviderKind) -> Option<&Arc<MockProvider>> {
        self.providers.get(&kind)
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, SwitchyardError> {
        self.orchestrator.generate(request).await
    }

    /// Shorthand: generate `prompt` for caller "test-caller" against `profile`.
    pub async fn ask(
        &self,
        prompt: &str,
        profile: &str,
    ) -> Result<GenerationOutcome, SwitchyardError> {
        let request =
            GenerationRequest::new(prompt, "test-caller")?.with_preferred_provider(profile);
        self.generate(&request).await
    }

    /// Flush the recorder, then return every persisted record.
    pub async fn records(&self) -> Result<Vec<UsageRecord>, SwitchyardError> {
        self.orchestrator.recorder().flush().await?;
        Ok(self.usage.records())
    }
}
