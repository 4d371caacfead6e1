// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for external AI model APIs.

use async_trait::async_trait;

use crate::error::SwitchyardError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GenerationRequest, ProviderKind, ProviderResult};

/// Translates a canonical [`GenerationRequest`] into one provider's wire call.
///
/// Implementations map the request flags onto the provider's own knobs,
/// ignore flags the provider has no equivalent for, parse token usage, and
/// surface every failure as [`SwitchyardError::Provider`]. They never swallow
/// errors and never write usage records.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// The provider this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// Perform exactly one call against `model` and return the canonical result.
    async fn invoke(
        &self,
        request: &GenerationRequest,
        model: &str,
    ) -> Result<ProviderResult, SwitchyardError>;
}
