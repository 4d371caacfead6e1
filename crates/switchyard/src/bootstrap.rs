// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process wiring shared by every subcommand.
//!
//! Opens storage, seeds configured pricing, builds the enabled provider
//! adapters and the orchestrator on top of them.

use std::sync::Arc;

use switchyard_agent::FallbackOrchestrator;
use switchyard_config::SwitchyardConfig;
use switchyard_config::model::CostConfig;
use switchyard_core::{
    PluginAdapter, PricingStore, ProviderAdapter, StorageAdapter, SwitchyardError,
};
use switchyard_cost::{CostCalculator, UsageRecorder};
use switchyard_storage::SqliteStorage;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[cfg(feature = "anthropic")]
use switchyard_anthropic::AnthropicProvider;
#[cfg(feature = "ollama")]
use switchyard_ollama::OllamaProvider;
#[cfg(feature = "openai")]
use switchyard_openai::OpenAiProvider;

/// Everything a running gateway needs.
pub struct Runtime {
    pub config: SwitchyardConfig,
    pub storage: Arc<SqliteStorage>,
    pub orchestrator: Arc<FallbackOrchestrator>,
    writer: JoinHandle<()>,
}

impl Runtime {
    pub async fn start(config: SwitchyardConfig) -> Result<Self, SwitchyardError> {
        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;
        seed_pricing(storage.as_ref(), &config.cost).await?;

        let costs = Arc::new(CostCalculator::new(storage.clone()));
        let (recorder, writer) =
            UsageRecorder::spawn(storage.clone(), config.cost.usage_queue_capacity);

        let mut orchestrator = FallbackOrchestrator::from_config(&config, costs, recorder)?;
        let adapters = build_adapters(&config);
        if adapters.is_empty() {
            warn!("no provider adapters enabled; every request will get the static fallback");
        }
        for adapter in adapters {
            orchestrator = orchestrator.with_adapter(adapter);
        }

        info!(
            database = %config.storage.database_path,
            profiles = orchestrator.router().chains().len(),
            "switchyard runtime ready"
        );

        Ok(Self {
            config,
            storage,
            orchestrator: Arc::new(orchestrator),
            writer,
        })
    }

    /// Shut down whatever `result` holds, then hand it back.
    ///
    /// An error in `result` takes precedence over a shutdown error.
    pub async fn finish<T>(
        self,
        result: Result<T, SwitchyardError>,
    ) -> Result<T, SwitchyardError> {
        let stopped = self.shutdown().await;
        if let (Err(_), Err(e)) = (&result, &stopped) {
            warn!(error = %e, "shutdown after a failed command also failed");
        }
        let value = result?;
        stopped?;
        Ok(value)
    }

    /// Flush pending usage, release adapters and close the database.
    pub async fn shutdown(self) -> Result<(), SwitchyardError> {
        self.orchestrator.recorder().flush().await?;
        let dropped = self.orchestrator.recorder().dropped_count();
        if dropped > 0 {
            warn!(dropped, "usage records were dropped during this run");
        }

        for adapter in self.orchestrator.adapters() {
            if let Err(e) = adapter.shutdown().await {
                warn!(adapter = adapter.name(), error = %e, "adapter shutdown failed");
            }
        }

        // Outstanding orchestrator handles keep the writer alive; it is
        // idle after the flush above.
        self.writer.abort();
        self.storage.close().await?;
        info!("switchyard runtime stopped");
        Ok(())
    }
}

/// Write configured prices into the pricing table, replacing stored rates.
pub async fn seed_pricing(
    store: &dyn PricingStore,
    cost: &CostConfig,
) -> Result<(), SwitchyardError> {
    for pricing in &cost.pricing {
        store.upsert_pricing(&pricing.to_entry()).await?;
    }
    debug!(entries = cost.pricing.len(), "pricing seeded from config");
    Ok(())
}

/// Adapters for every enabled provider that could be constructed.
///
/// A provider that fails to build (usually a missing API key) is skipped
/// with a warning; its chain slots then count as failed attempts.
pub fn build_adapters(config: &SwitchyardConfig) -> Vec<Arc<dyn ProviderAdapter>> {
    let mut adapters: Vec<Arc<dyn ProviderAdapter>> = Vec::new();

    #[cfg(feature = "anthropic")]
    if config.anthropic.enabled {
        match AnthropicProvider::new(&config.anthropic) {
            Ok(provider) => adapters.push(Arc::new(provider)),
            Err(e) => warn!(provider = "anthropic", error = %e, "provider not available"),
        }
    }

    #[cfg(feature = "openai")]
    if config.openai.enabled {
        match OpenAiProvider::new(&config.openai) {
            Ok(provider) => adapters.push(Arc::new(provider)),
            Err(e) => warn!(provider = "openai", error = %e, "provider not available"),
        }
    }

    #[cfg(feature = "ollama")]
    if config.ollama.enabled {
        match OllamaProvider::new(&config.ollama) {
            Ok(provider) => adapters.push(Arc::new(provider)),
            Err(e) => warn!(provider = "ollama", error = %e, "provider not available"),
        }
    }

    adapters
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_core::{DateRange, ProviderKind, UsageRecord, UsageStatus, UsageStore};

    fn test_config(dir: &tempfile::TempDir) -> SwitchyardConfig {
        let mut config = SwitchyardConfig::default();
        config.storage.database_path =
            dir.path().join("usage.db").to_string_lossy().into_owned();
        config.anthropic.enabled = false;
        config.openai.enabled = false;
        config
    }

    #[tokio::test]
    async fn disabled_providers_are_not_built() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir);
        config.ollama.enabled = false;
        assert!(build_adapters(&config).is_empty());
    }

    #[cfg(feature = "ollama")]
    #[tokio::test]
    async fn ollama_needs_no_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let kinds: Vec<ProviderKind> =
            build_adapters(&config).iter().map(|a| a.kind()).collect();
        assert_eq!(kinds, vec![ProviderKind::Ollama]);
    }

    #[tokio::test]
    async fn start_seeds_pricing_and_shuts_down_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let expected = config.cost.pricing.len();

        let runtime = Runtime::start(config).await.unwrap();
        let table = runtime.orchestrator.costs().table().await;
        assert_eq!(table.len(), expected);
        runtime.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn failed_command_still_flushes_usage() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let storage_config = config.storage.clone();

        let runtime = Runtime::start(config).await.unwrap();
        runtime.orchestrator.recorder().record(UsageRecord::new(
            "cli",
            "agent-cloud",
            "openai",
            "gpt-4o",
            UsageStatus::Success,
        ));
        let result: Result<(), SwitchyardError> =
            Err(SwitchyardError::Internal("command blew up".into()));

        let err = runtime.finish(result).await.unwrap_err();
        assert!(err.to_string().contains("command blew up"));

        let reopened = SqliteStorage::new(storage_config);
        reopened.initialize().await.unwrap();
        let usage = reopened
            .aggregate_usage("cli", DateRange::all_time())
            .await
            .unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].count, 1);
    }

    #[tokio::test]
    async fn finish_passes_through_success() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::start(test_config(&dir)).await.unwrap();
        assert_eq!(runtime.finish(Ok(7)).await.unwrap(), 7);
    }
}
