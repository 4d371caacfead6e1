// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use switchyard_config::model::StorageConfig;
use switchyard_core::{
    AdapterType, DateRange, HealthStatus, PerformanceAggregate, PluginAdapter, PricingEntry,
    PricingStore, StorageAdapter, SwitchyardError, UsageAggregate, UsageRecord, UsageStore,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed usage ledger and pricing store.
///
/// The database is opened by [`StorageAdapter::initialize`]; every other
/// operation fails until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, SwitchyardError> {
        self.db.get().ok_or_else(|| SwitchyardError::Storage {
            source: "storage not initialized; call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, SwitchyardError> {
        self.db()?
            .connection()
            .call(|conn| conn.execute_batch("SELECT 1;"))
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SwitchyardError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), SwitchyardError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| SwitchyardError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), SwitchyardError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl UsageStore for SqliteStorage {
    async fn insert_usage(&self, record: &UsageRecord) -> Result<(), SwitchyardError> {
        queries::usage::insert_usage(self.db()?, record).await
    }

    async fn aggregate_usage(
        &self,
        caller_id: &str,
        range: DateRange,
    ) -> Result<Vec<UsageAggregate>, SwitchyardError> {
        queries::usage::aggregate_usage(self.db()?, caller_id, range).await
    }

    async fn aggregate_performance(
        &self,
        agent_id: &str,
    ) -> Result<Vec<PerformanceAggregate>, SwitchyardError> {
        queries::usage::aggregate_performance(self.db()?, agent_id).await
    }
}

#[async_trait]
impl PricingStore for SqliteStorage {
    async fn load_pricing(&self) -> Result<Vec<PricingEntry>, SwitchyardError> {
        queries::pricing::load_pricing(self.db()?).await
    }

    async fn upsert_pricing(&self, entry: &PricingEntry) -> Result<(), SwitchyardError> {
        queries::pricing::upsert_pricing(self.db()?, entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_core::{TokenUsage, UsageStatus};
    use tempfile::tempdir;

    fn make_config(path: &std::path::Path) -> StorageConfig {
        StorageConfig {
            database_path: path.to_str().unwrap().to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn identifies_as_storage_adapter() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(&dir.path().join("a.db")));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(&dir.path().join("b.db")));
        assert!(storage.health_check().await.is_err());
        assert!(storage.load_pricing().await.is_err());
        // Shutdown without a database is a no-op.
        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn initialize_twice_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.db");
        let storage = SqliteStorage::new(make_config(&path));
        storage.initialize().await.unwrap();
        assert!(path.exists());
        assert!(storage.initialize().await.is_err());
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn ledger_and_pricing_through_traits() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(&dir.path().join("d.db")));
        storage.initialize().await.unwrap();

        let record =
            UsageRecord::new("alice", "agent-cloud", "openai", "gpt-4o", UsageStatus::Success)
                .with_usage(TokenUsage::new(1000, 500), 0.0075)
                .with_latency_ms(420);
        storage.insert_usage(&record).await.unwrap();

        let usage = storage
            .aggregate_usage("alice", DateRange::last_days(1))
            .await
            .unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].total_tokens, 1500);

        let perf = storage.aggregate_performance("agent-cloud").await.unwrap();
        assert_eq!(perf[0].avg_latency_ms, 420.0);

        storage
            .upsert_pricing(&PricingEntry {
                provider: "openai".into(),
                model: "gpt-4o".into(),
                input_cost_per_1k: 0.0025,
                output_cost_per_1k: 0.01,
            })
            .await
            .unwrap();
        assert_eq!(storage.load_pricing().await.unwrap().len(), 1);

        storage.close().await.unwrap();
    }
}
