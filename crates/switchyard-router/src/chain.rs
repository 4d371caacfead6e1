// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered provider candidates for one agent profile.

use std::fmt;

use switchyard_core::ProviderKind;

/// Priority of the primary candidate.
pub const PRIMARY_PRIORITY: u32 = 1;

/// One `(provider, model)` entry of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub provider: ProviderKind,
    pub model: String,
    pub priority: u32,
}

impl Candidate {
    pub fn new(provider: ProviderKind, model: impl Into<String>, priority: u32) -> Self {
        Self {
            provider,
            model: model.into(),
            priority,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.priority == PRIMARY_PRIORITY
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Candidates in the order they are tried. Never empty: the primary is
/// always first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateChain {
    profile: String,
    agent_id: String,
    candidates: Vec<Candidate>,
}

impl CandidateChain {
    /// Build a chain from a primary and its fallbacks.
    ///
    /// Fallbacks are ordered by ascending priority; equal priorities keep
    /// their configured order.
    pub fn new(
        profile: impl Into<String>,
        agent_id: impl Into<String>,
        primary: (ProviderKind, String),
        fallbacks: impl IntoIterator<Item = Candidate>,
    ) -> Self {
        let mut rest: Vec<Candidate> = fallbacks.into_iter().collect();
        rest.sort_by_key(|c| c.priority);

        let mut candidates = Vec::with_capacity(rest.len() + 1);
        candidates.push(Candidate::new(primary.0, primary.1, PRIMARY_PRIORITY));
        candidates.extend(rest);

        Self {
            profile: profile.into(),
            agent_id: agent_id.into(),
            candidates,
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Agent identity stamped on usage rows for this chain.
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn primary(&self) -> &Candidate {
        // `new` always pushes the primary.
        &self.candidates[0]
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

impl<'a> IntoIterator for &'a CandidateChain {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
