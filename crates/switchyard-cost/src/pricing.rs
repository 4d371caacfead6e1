// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing lookup and cost calculation.
//!
//! Rates are USD per 1,000 tokens, keyed by exact `(provider, model)`.
//! A missing entry costs nothing: cost accounting is telemetry, not billing,
//! and an unpriced model must never block usage recording.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use switchyard_core::{PricingEntry, PricingStore, SwitchyardError, TokenUsage};

/// Immutable snapshot of the pricing table.
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    entries: HashMap<(String, String), PricingEntry>,
}

impl PricingTable {
    /// Build a table. Later duplicates replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = PricingEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| ((e.provider.clone(), e.model.clone()), e))
            .collect();
        Self { entries }
    }

    pub fn get(&self, provider: &str, model: &str) -> Option<&PricingEntry> {
        self.entries.get(&(provider.to_string(), model.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by provider then model.
    pub fn entries(&self) -> Vec<&PricingEntry> {
        let mut all: Vec<_> = self.entries.values().collect();
        all.sort_by(|a, b| (&a.provider, &a.model).cmp(&(&b.provider, &b.model)));
        all
    }

    /// `input/1000 * input_rate + output/1000 * output_rate`, or 0 if unpriced.
    pub fn cost(&self, provider: &str, model: &str, usage: TokenUsage) -> f64 {
        match self.get(provider, model) {
            Some(entry) => {
                f64::from(usage.input_tokens) / 1000.0 * entry.input_cost_per_1k
                    + f64::from(usage.output_tokens) / 1000.0 * entry.output_cost_per_1k
            }
            None => 0.0,
        }
    }
}

/// Process-wide pricing cache in front of a [`PricingStore`].
///
/// Loaded lazily on first use and kept until [`refresh`](Self::refresh).
/// Readers never block on each other; loads are serialized.
pub struct CostCalculator {
    store: Arc<dyn PricingStore>,
    cache: ArcSwapOption<PricingTable>,
    load_lock: Mutex<()>,
}

impl CostCalculator {
    pub fn new(store: Arc<dyn PricingStore>) -> Self {
        Self {
            store,
            cache: ArcSwapOption::empty(),
            load_lock: Mutex::new(()),
        }
    }

    /// Current table, loading it on first use.
    ///
    /// A failed load yields an empty table that is not cached, so the next
    /// call tries again.
    pub async fn table(&self) -> Arc<PricingTable> {
        if let Some(table) = self.cache.load_full() {
            return table;
        }

        let _guard = self.load_lock.lock().await;
        if let Some(table) = self.cache.load_full() {
            return table;
        }

        match self.load().await {
            Ok(table) => {
                let table = Arc::new(table);
                self.cache.store(Some(Arc::clone(&table)));
                table
            }
            Err(e) => {
                warn!(error = %e, "pricing load failed; costing at zero");
                Arc::new(PricingTable::default())
            }
        }
    }

    /// Reload from the store and replace the cache. On error the previous
    /// table stays in place.
    pub async fn refresh(&self) -> Result<Arc<PricingTable>, SwitchyardError> {
        let _guard = self.load_lock.lock().await;
        let table = Arc::new(self.load().await?);
        self.cache.store(Some(Arc::clone(&table)));
        debug!(entries = table.len(), "pricing table refreshed");
        Ok(table)
    }

    /// Cost of one call. Never fails.
    pub async fn cost(&self, provider: &str, model: &str, usage: TokenUsage) -> f64 {
        self.table().await.cost(provider, model, usage)
    }

    async fn load(&self) -> Result<PricingTable, SwitchyardError> {
        let entries = self.store.load_pricing().await?;
        Ok(PricingTable::from_entries(entries))
    }
}
