// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `UsageStore` and `PricingStore` with failure injection.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::{Notify, watch};

use switchyard_core::{
    AdapterType, DateRange, HealthStatus, PerformanceAggregate, PluginAdapter, PricingEntry,
    PricingStore, SwitchyardError, UsageAggregate, UsageRecord, UsageStore,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn injected_failure(what: &str) -> SwitchyardError {
    SwitchyardError::Storage {
        source: format!("injected {what} failure").into(),
    }
}

/// Captures usage records and aggregates them the way the SQLite store does.
pub struct MemoryUsageStore {
    records: Mutex<Vec<UsageRecord>>,
    fail_writes: AtomicBool,
    paused: watch::Sender<bool>,
    parked: Notify,
}

impl Default for MemoryUsageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            paused: watch::Sender::new(false),
            parked: Notify::new(),
        }
    }

    /// Everything written so far, in write order.
    pub fn records(&self) -> Vec<UsageRecord> {
        lock(&self.records).clone()
    }

    /// Make every subsequent `insert_usage` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Hold writes until [`resume_writes`](Self::resume_writes) is called.
    pub fn pause_writes(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume_writes(&self) {
        self.paused.send_replace(false);
    }

    /// Resolves once a write is parked behind [`pause_writes`](Self::pause_writes).
    pub async fn wait_for_parked_write(&self) {
        self.parked.notified().await;
    }
}

#[async_trait]
impl PluginAdapter for MemoryUsageStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    /// Unhealthy while write failures are being injected.
    async fn health_check(&self) -> Result<HealthStatus, SwitchyardError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Unhealthy("writes are failing".into()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SwitchyardError> {
        Ok(())
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn insert_usage(&self, record: &UsageRecord) -> Result<(), SwitchyardError> {
        let paused = *self.paused.borrow();
        if paused {
            let mut gate = self.paused.subscribe();
            self.parked.notify_one();
            // The sender lives in `self`, so the channel cannot close here.
            let _ = gate.wait_for(|paused| !*paused).await;
        }

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected_failure("write"));
        }
        lock(&self.records).push(record.clone());
        Ok(())
    }

    async fn aggregate_usage(
        &self,
        caller_id: &str,
        range: DateRange,
    ) -> Result<Vec<UsageAggregate>, SwitchyardError> {
        let mut groups: BTreeMap<(String, String), UsageAggregate> = BTreeMap::new();
        for record in lock(&self.records)
            .iter()
            .filter(|r| r.caller_id == caller_id && range.contains(&r.created_at))
        {
            let entry = groups
                .entry((record.provider.clone(), record.agent_id.clone()))
                .or_insert_with(|| UsageAggregate {
                    provider: record.provider.clone(),
                    agent_id: record.agent_id.clone(),
                    total_tokens: 0,
                    total_cost_usd: 0.0,
                    count: 0,
                });
            entry.total_tokens += record.total_tokens();
            entry.total_cost_usd += record.cost_usd;
            entry.count += 1;
        }
        Ok(groups.into_values().collect())
    }

    async fn aggregate_performance(
        &self,
        agent_id: &str,
    ) -> Result<Vec<PerformanceAggregate>, SwitchyardError> {
        // (latency sum, cost sum, aggregate)
        let mut groups: BTreeMap<(String, String), (u64, f64, PerformanceAggregate)> =
            BTreeMap::new();
        for record in lock(&self.records).iter().filter(|r| r.agent_id == agent_id) {
            let (latency, cost, aggregate) = groups
                .entry((record.provider.clone(), record.model.clone()))
                .or_insert_with(|| {
                    (
                        0,
                        0.0,
                        PerformanceAggregate {
                            provider: record.provider.clone(),
                            model: record.model.clone(),
                            avg_latency_ms: 0.0,
                            avg_cost_usd: 0.0,
                            count_by_status: BTreeMap::new(),
                        },
                    )
                });
            *latency += record.latency_ms;
            *cost += record.cost_usd;
            *aggregate
                .count_by_status
                .entry(record.status.to_string())
                .or_insert(0) += 1;
        }

        Ok(groups
            .into_values()
            .map(|(latency, cost, mut aggregate)| {
                let n = aggregate.total_count() as f64;
                aggregate.avg_latency_ms = latency as f64 / n;
                aggregate.avg_cost_usd = cost / n;
                aggregate
            })
            .collect())
    }
}

/// Pricing entries held in memory, with a load counter.
pub struct MemoryPricingStore {
    entries: Mutex<Vec<PricingEntry>>,
    loads: AtomicUsize,
    fail_loads: AtomicBool,
}

impl MemoryPricingStore {
    pub fn new(entries: Vec<PricingEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            loads: AtomicUsize::new(0),
            fail_loads: AtomicBool::new(false),
        }
    }

    /// Replace every entry.
    pub fn set(&self, entries: Vec<PricingEntry>) {
        *lock(&self.entries) = entries;
    }

    /// Number of `load_pricing` calls so far, failed ones included.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PricingStore for MemoryPricingStore {
    async fn load_pricing(&self) -> Result<Vec<PricingEntry>, SwitchyardError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(injected_failure("pricing load"));
        }
        Ok(lock(&self.entries).clone())
    }

    async fn upsert_pricing(&self, entry: &PricingEntry) -> Result<(), SwitchyardError> {
        let mut entries = lock(&self.entries);
        match entries
            .iter_mut()
            .find(|e| e.provider == entry.provider && e.model == entry.model)
        {
            Some(existing) => *existing = entry.clone(),
            None => entries.push(entry.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_core::{TokenUsage, UsageStatus};

    fn record(caller: &str, provider: &str, status: UsageStatus, latency: u64) -> UsageRecord {
        UsageRecord::new(caller, "agent-cloud", provider, "m", status)
            .with_usage(TokenUsage::new(100, 50), 0.5)
            .with_latency_ms(latency)
    }

    #[tokio::test]
    async fn health_follows_injected_write_failures() {
        let store = MemoryUsageStore::new();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
        store.fail_writes(true);
        assert!(matches!(
            store.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[tokio::test]
    async fn aggregates_match_sql_grouping() {
        let store = MemoryUsageStore::new();
        store.insert_usage(&record("c1", "anthropic", UsageStatus::Failed, 100)).await.unwrap();
        store.insert_usage(&record("c1", "openai", UsageStatus::Success, 300)).await.unwrap();
        store.insert_usage(&record("c1", "openai", UsageStatus::Success, 500)).await.unwrap();
        store.insert_usage(&record("c2", "openai", UsageStatus::Success, 1)).await.unwrap();

        let usage = store.aggregate_usage("c1", DateRange::all_time()).await.unwrap();
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[1].provider, "openai");
        assert_eq!(usage[1].count, 2);
        assert_eq!(usage[1].total_tokens, 300);
        assert!((usage[1].total_cost_usd - 1.0).abs() < 1e-9);

        let perf = store.aggregate_performance("agent-cloud").await.unwrap();
        let openai = perf.iter().find(|p| p.provider == "openai").unwrap();
        assert_eq!(openai.total_count(), 3);
        assert!((openai.avg_latency_ms - 267.0).abs() < 1.0);
        assert_eq!(openai.count_by_status.get("success"), Some(&3));
    }

    #[tokio::test]
    async fn injected_failures_surface_as_storage_errors() {
        let store = MemoryUsageStore::new();
        store.fail_writes(true);
        let err = store
            .insert_usage(&record("c1", "openai", UsageStatus::Success, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, SwitchyardError::Storage { .. }));
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn pricing_upsert_replaces_existing_entry() {
        let store = MemoryPricingStore::new(vec![]);
        let mut entry = PricingEntry {
            provider: "openai".into(),
            model: "gpt-4o".into(),
            input_cost_per_1k: 1.0,
            output_cost_per_1k: 2.0,
        };
        store.upsert_pricing(&entry).await.unwrap();
        entry.input_cost_per_1k = 3.0;
        store.upsert_pricing(&entry).await.unwrap();

        let loaded = store.load_pricing().await.unwrap();
        assert_eq!(loaded, vec![entry]);
        assert_eq!(store.load_count(), 1);
    }
}
