// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Switchyard gateway.
//!
//! This crate provides the error type, the domain types exchanged between the
//! router, provider adapters, orchestrator and storage, and the adapter traits
//! every provider and persistence backend implements.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SwitchyardError;
pub use types::{
    AdapterType, DateRange, GenerationOutcome, GenerationRequest, HealthStatus,
    PerformanceAggregate, PricingEntry, ProviderKind, ProviderResult, ReasoningEffort,
    TokenUsage, UsageAggregate, UsageRecord, UsageStatus,
};

pub use traits::{
    PluginAdapter, PricingStore, ProviderAdapter, StorageAdapter, UsageStore,
};
