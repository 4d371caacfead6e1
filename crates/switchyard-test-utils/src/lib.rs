// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Switchyard integration tests.
//!
//! Mock adapters and in-memory stores for fast, deterministic tests that
//! never touch a real provider or database.
//!
//! # Components
//!
//! - [`MockProvider`] - scripted provider adapter (success, failure or hang)
//! - [`MemoryUsageStore`] / [`MemoryPricingStore`] - in-memory stores with failure injection
//! - [`TestHarness`] - a fully wired orchestrator built from the above

pub mod harness;
pub mod memory_store;
pub mod mock_provider;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_store::{MemoryPricingStore, MemoryUsageStore};
pub use mock_provider::{MockProvider, MockReply};
