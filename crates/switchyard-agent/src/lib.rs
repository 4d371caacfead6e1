// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallback orchestration for the Switchyard gateway.
//!
//! [`FallbackOrchestrator`] walks the candidate chain picked by the router,
//! one provider at a time, and records one usage row per attempt. When the
//! whole chain fails it answers with the static offline response instead of
//! an error.

pub mod orchestrator;

pub use orchestrator::FallbackOrchestrator;
