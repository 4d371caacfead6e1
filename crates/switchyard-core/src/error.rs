// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Switchyard gateway.

use thiserror::Error;

use crate::types::ProviderKind;

/// The primary error type used across all Switchyard crates.
#[derive(Debug, Error)]
pub enum SwitchyardError {
    /// Configuration errors (invalid TOML, unknown profile, missing API key).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A single provider attempt failed: network failure, non-2xx response,
    /// malformed body, content-safety rejection, or timeout.
    #[error("provider error ({provider}): {message}")]
    Provider {
        provider: ProviderKind,
        http_status: Option<u16>,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The request failed validation before any provider was attempted.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller went away while the request was in flight.
    #[error("request cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SwitchyardError {
    /// Shorthand for a provider error without HTTP status or source.
    pub fn provider(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            http_status: None,
            message: message.into(),
            source: None,
        }
    }

    /// Provider error carrying the HTTP status the provider answered with.
    pub fn provider_status(
        provider: ProviderKind,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider,
            http_status: Some(status),
            message: message.into(),
            source: None,
        }
    }

    /// Provider error wrapping an underlying cause (reqwest, serde_json, ...).
    pub fn provider_source<E>(provider: ProviderKind, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Provider {
            provider,
            http_status: None,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// HTTP status attached to a provider error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Provider { http_status, .. } => *http_status,
            _ => None,
        }
    }
}
