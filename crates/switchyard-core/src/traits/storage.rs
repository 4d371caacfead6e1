// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits: backend lifecycle, the usage ledger, and the pricing table.

use async_trait::async_trait;

use crate::error::SwitchyardError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{DateRange, PerformanceAggregate, PricingEntry, UsageAggregate, UsageRecord};

/// Lifecycle of a persistence backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), SwitchyardError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), SwitchyardError>;
}

/// Append-only usage ledger with read-side aggregation.
#[async_trait]
pub trait UsageStore: Send + Sync + 'static {
    /// Append one record. Records are never updated afterwards.
    async fn insert_usage(&self, record: &UsageRecord) -> Result<(), SwitchyardError>;

    /// Totals for one caller within `range`, grouped by provider and agent.
    async fn aggregate_usage(
        &self,
        caller_id: &str,
        range: DateRange,
    ) -> Result<Vec<UsageAggregate>, SwitchyardError>;

    /// Latency/cost profile for one agent, grouped by provider and model.
    async fn aggregate_performance(
        &self,
        agent_id: &str,
    ) -> Result<Vec<PerformanceAggregate>, SwitchyardError>;
}

/// Read-mostly source of pricing reference data.
#[async_trait]
pub trait PricingStore: Send + Sync + 'static {
    /// Load every pricing entry.
    async fn load_pricing(&self) -> Result<Vec<PricingEntry>, SwitchyardError>;

    /// Insert or replace the entry for `(provider, model)`.
    async fn upsert_pricing(&self, entry: &PricingEntry) -> Result<(), SwitchyardError>;
}
