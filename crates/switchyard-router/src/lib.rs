// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Candidate chain resolution for the Switchyard gateway.
//!
//! [`AgentRouter`] turns a coarse provider preference into the fixed,
//! hand-curated [`CandidateChain`] the orchestrator walks.

pub mod chain;
pub mod router;

pub use chain::{Candidate, CandidateChain, PRIMARY_PRIORITY};
pub use router::AgentRouter;
