// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sequential provider fallback with per-attempt usage accounting.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use switchyard_config::SwitchyardConfig;
use switchyard_core::types::{STATIC_FALLBACK_PROVIDER, STATIC_USAGE_MODEL, STATIC_USAGE_PROVIDER};
use switchyard_core::{
    GenerationOutcome, GenerationRequest, ProviderAdapter, ProviderKind, ProviderResult,
    SwitchyardError, UsageRecord, UsageStatus,
};
use switchyard_cost::{CostCalculator, UsageRecorder};
use switchyard_fallback::{StaticFallbackResponder, truncate_chars};
use switchyard_router::{AgentRouter, Candidate};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Upper bound on a single provider call when none is configured.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(90);

/// Stored error messages are cut to this many characters by default.
pub const DEFAULT_MAX_ERROR_CHARS: usize = 300;

/// Runs a request down its candidate chain until one provider answers.
///
/// Candidates are tried strictly in chain order, one at a time, each at most
/// once. Every attempt produces exactly one [`UsageRecord`]. If the whole
/// chain fails, an extra failed record is written for the static fallback
/// and the offline answer is returned.
pub struct FallbackOrchestrator {
    router: AgentRouter,
    adapters: BTreeMap<ProviderKind, Arc<dyn ProviderAdapter>>,
    costs: Arc<CostCalculator>,
    recorder: UsageRecorder,
    responder: StaticFallbackResponder,
    attempt_timeout: Duration,
    max_error_chars: usize,
}

/// How a single attempt ended.
enum Attempt {
    Answered(ProviderResult),
    Failed(SwitchyardError),
    Cancelled,
}

impl FallbackOrchestrator {
    /// Create an orchestrator with no adapters registered.
    pub fn new(
        router: AgentRouter,
        costs: Arc<CostCalculator>,
        recorder: UsageRecorder,
        responder: StaticFallbackResponder,
    ) -> Self {
        Self {
            router,
            adapters: BTreeMap::new(),
            costs,
            recorder,
            responder,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            max_error_chars: DEFAULT_MAX_ERROR_CHARS,
        }
    }

    /// Build router, responder and limits from configuration.
    pub fn from_config(
        config: &SwitchyardConfig,
        costs: Arc<CostCalculator>,
        recorder: UsageRecorder,
    ) -> Result<Self, SwitchyardError> {
        let router = AgentRouter::from_config(&config.routing)?;
        let responder = StaticFallbackResponder::new(&config.fallback);
        Ok(Self::new(router, costs, recorder, responder)
            .with_attempt_timeout(Duration::from_secs(config.routing.attempt_timeout_secs))
            .with_max_error_chars(config.fallback.max_error_chars))
    }

    /// Register the adapter serving its [`ProviderKind`], replacing any earlier one.
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        let kind = adapter.kind();
        if self.adapters.insert(kind, adapter).is_some() {
            warn!(provider = %kind, "replacing previously registered adapter");
        }
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_max_error_chars(mut self, max_chars: usize) -> Self {
        self.max_error_chars = max_chars;
        self
    }

    pub fn router(&self) -> &AgentRouter {
        &self.router
    }

    pub fn costs(&self) -> &Arc<CostCalculator> {
        &self.costs
    }

    pub fn recorder(&self) -> &UsageRecorder {
        &self.recorder
    }

    /// Registered adapters, ordered by provider.
    pub fn adapters(&self) -> impl Iterator<Item = &Arc<dyn ProviderAdapter>> {
        self.adapters.values()
    }

    /// Generate text for `request`, degrading to the offline answer if needed.
    ///
    /// Only fails when the request itself is invalid.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, SwitchyardError> {
        self.generate_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Like [`generate`](Self::generate), but stops as soon as `cancel` fires.
    ///
    /// The in-flight attempt is recorded as cancelled and no further
    /// candidates are tried.
    pub async fn generate_with_cancel(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome, SwitchyardError> {
        request.validate()?;

        let chain = self.router.resolve(request.preferred_provider.as_deref());
        let agent_id = chain.agent_id();
        debug!(
            caller_id = %request.caller_id,
            profile = chain.profile(),
            candidates = chain.len(),
            "resolved candidate chain"
        );

        let mut last_error: Option<String> = None;
        for (index, candidate) in chain.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(caller_id = %request.caller_id, "request cancelled before next candidate");
                return Err(SwitchyardError::Cancelled);
            }

            let started = Instant::now();
            let attempt = self.attempt(request, candidate, cancel).await;
            let latency_ms = elapsed_ms(started);
            let fallback_used = index > 0;

            match attempt {
                Attempt::Answered(result) => {
                    let cost = self
                        .costs
                        .cost(&candidate.provider.to_string(), &candidate.model, result.usage)
                        .await;
                    self.recorder.record(
                        self.record(request, agent_id, candidate, UsageStatus::Success)
                            .with_usage(result.usage, cost)
                            .with_latency_ms(latency_ms),
                    );
                    info!(
                        caller_id = %request.caller_id,
                        provider = %candidate.provider,
                        model = %candidate.model,
                        latency_ms,
                        input_tokens = result.usage.input_tokens,
                        output_tokens = result.usage.output_tokens,
                        cost_usd = cost,
                        fallback_used,
                        "generation succeeded"
                    );
                    return Ok(GenerationOutcome {
                        text: result.text,
                        fallback_used,
                        provider_used: result.provider_used,
                    });
                }
                Attempt::Failed(error) => {
                    let message = truncate_chars(&error_message(&error), self.max_error_chars);
                    warn!(
                        caller_id = %request.caller_id,
                        provider = %candidate.provider,
                        model = %candidate.model,
                        latency_ms,
                        http_status = ?error.http_status(),
                        error = %message,
                        "provider attempt failed; advancing chain"
                    );
                    self.recorder.record(
                        self.record(request, agent_id, candidate, UsageStatus::Failed)
                            .with_latency_ms(latency_ms)
                            .with_error(message.clone()),
                    );
                    last_error = Some(message);
                }
                Attempt::Cancelled => {
                    info!(
                        caller_id = %request.caller_id,
                        provider = %candidate.provider,
                        model = %candidate.model,
                        latency_ms,
                        "request cancelled during provider attempt"
                    );
                    self.recorder.record(
                        self.record(request, agent_id, candidate, UsageStatus::Cancelled)
                            .with_latency_ms(latency_ms)
                            .with_error("request cancelled"),
                    );
                    return Err(SwitchyardError::Cancelled);
                }
            }
        }

        let last_error = last_error.unwrap_or_default();
        warn!(
            caller_id = %request.caller_id,
            agent_id,
            attempts = chain.len(),
            last_error = %last_error,
            "every provider failed; serving static fallback"
        );
        let text = self.responder.render(&request.prompt, agent_id, &last_error);
        self.recorder.record(
            UsageRecord::new(
                request.caller_id.clone(),
                agent_id,
                STATIC_USAGE_PROVIDER,
                STATIC_USAGE_MODEL,
                UsageStatus::Failed,
            )
            .with_error(last_error),
        );

        Ok(GenerationOutcome {
            text,
            fallback_used: true,
            provider_used: STATIC_FALLBACK_PROVIDER.to_string(),
        })
    }

    /// One bounded call against `candidate`, raced against cancellation.
    async fn attempt(
        &self,
        request: &GenerationRequest,
        candidate: &Candidate,
        cancel: &CancellationToken,
    ) -> Attempt {
        let Some(adapter) = self.adapters.get(&candidate.provider) else {
            return Attempt::Failed(SwitchyardError::provider(
                candidate.provider,
                "no adapter registered for provider",
            ));
        };

        let call = tokio::time::timeout(
            self.attempt_timeout,
            adapter.invoke(request, &candidate.model),
        );
        tokio::select! {
            biased;
            () = cancel.cancelled() => Attempt::Cancelled,
            outcome = call => match outcome {
                Ok(Ok(result)) => Attempt::Answered(result),
                Ok(Err(SwitchyardError::Cancelled)) => Attempt::Cancelled,
                Ok(Err(e)) => Attempt::Failed(e),
                Err(_elapsed) => Attempt::Failed(SwitchyardError::provider(
                    candidate.provider,
                    format!("request timed out after {}s", self.attempt_timeout.as_secs_f64()),
                )),
            },
        }
    }

    fn record(
        &self,
        request: &GenerationRequest,
        agent_id: &str,
        candidate: &Candidate,
        status: UsageStatus,
    ) -> UsageRecord {
        UsageRecord::new(
            request.caller_id.clone(),
            agent_id,
            candidate.provider.to_string(),
            candidate.model.clone(),
            status,
        )
    }
}

/// The provider's own message, without the error-kind prefix.
fn error_message(error: &SwitchyardError) -> String {
    match error {
        SwitchyardError::Provider { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
