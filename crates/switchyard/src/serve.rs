// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `switchyard serve`: the HTTP surface over the orchestrator.
//!
//! Routes:
//! - POST /v1/generate
//! - GET /v1/usage?caller_id=&days=
//! - GET /v1/performance/{agent_id}
//! - POST /v1/pricing/refresh
//! - GET /health

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use switchyard_agent::FallbackOrchestrator;
use switchyard_core::{
    DateRange, GenerationOutcome, GenerationRequest, HealthStatus, PluginAdapter, PricingEntry,
    ProviderAdapter, SwitchyardError, UsageStore,
};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::bootstrap::Runtime;
use crate::shutdown;

/// A usage ledger that also reports its own health.
pub trait UsageBackend: UsageStore + PluginAdapter {}

impl<T: UsageStore + PluginAdapter> UsageBackend for T {}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<FallbackOrchestrator>,
    pub usage: Arc<dyn UsageBackend>,
    pub started: Instant,
}

impl AppState {
    pub fn new(orchestrator: Arc<FallbackOrchestrator>, usage: Arc<dyn UsageBackend>) -> Self {
        Self {
            orchestrator,
            usage,
            started: Instant::now(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Maps core errors onto HTTP statuses.
pub struct ApiError(SwitchyardError);

impl From<SwitchyardError> for ApiError {
    fn from(e: SwitchyardError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SwitchyardError::Validation(_) => StatusCode::BAD_REQUEST,
            SwitchyardError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Query string for GET /v1/usage.
#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    #[serde(default)]
    pub caller_id: Option<String>,
    /// Trailing window in days. Absent means all time.
    #[serde(default)]
    pub days: Option<u32>,
}

/// Response body for POST /v1/pricing/refresh.
#[derive(Debug, Serialize, Deserialize)]
pub struct PricingResponse {
    pub entries: Vec<PricingEntry>,
}

/// Health of one storage or provider component.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    /// "ok", "degraded" or "unhealthy".
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ComponentHealth {
    fn from_check(name: String, check: Result<HealthStatus, SwitchyardError>) -> Self {
        let (status, detail) = match check {
            Ok(HealthStatus::Healthy) => ("ok", None),
            Ok(HealthStatus::Degraded(reason)) => ("degraded", Some(reason)),
            Ok(HealthStatus::Unhealthy(reason)) => ("unhealthy", Some(reason)),
            Err(e) => ("unhealthy", Some(e.to_string())),
        };
        Self {
            name,
            status: status.to_string(),
            detail,
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub providers: Vec<String>,
    pub components: Vec<ComponentHealth>,
}

/// Build the router. Separate from [`run_serve`] so tests can drive it directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/v1/generate", post(post_generate))
        .route("/v1/usage", get(get_usage))
        .route("/v1/performance/{agent_id}", get(get_performance))
        .route("/v1/pricing/refresh", post(post_pricing_refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /v1/generate
///
/// 200 with the outcome, or 503 with the same body when every provider
/// failed and the offline answer was served.
pub async fn post_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;

    // Generation runs on its own task so that a client disconnect, which
    // drops this handler, cancels it through the guard instead of abandoning
    // it mid-attempt.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let orchestrator = Arc::clone(&state.orchestrator);
    let task = tokio::spawn(async move {
        orchestrator
            .generate_with_cancel(&request, &cancel)
            .await
    });

    let outcome: GenerationOutcome = task
        .await
        .map_err(|e| SwitchyardError::Internal(format!("generation task failed: {e}")))??;

    let status = if outcome.is_static_fallback() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)).into_response())
}

/// GET /v1/usage?caller_id=&days=
pub async fn get_usage(
    State(state): State<AppState>,
    Query(query): Query<UsageQuery>,
) -> Result<Response, ApiError> {
    let caller_id = query
        .caller_id
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| SwitchyardError::Validation("caller_id is required".into()))?;
    let range = query.days.map_or_else(DateRange::all_time, DateRange::last_days);
    let rows = state.usage.aggregate_usage(&caller_id, range).await?;
    Ok(Json(rows).into_response())
}

/// GET /v1/performance/{agent_id}
pub async fn get_performance(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Response, ApiError> {
    let rows = state.usage.aggregate_performance(&agent_id).await?;
    Ok(Json(rows).into_response())
}

/// POST /v1/pricing/refresh
pub async fn post_pricing_refresh(State(state): State<AppState>) -> Result<Response, ApiError> {
    let table = state.orchestrator.costs().refresh().await?;
    info!(entries = table.len(), "pricing table refreshed");
    let entries = table.entries().into_iter().cloned().collect();
    Ok(Json(PricingResponse { entries }).into_response())
}

/// GET /health
///
/// Unhealthy (503) when storage fails its check. Degraded when a provider
/// fails its check or none is registered.
pub async fn get_health(State(state): State<AppState>) -> Response {
    let mut components = vec![ComponentHealth::from_check(
        format!("storage:{}", state.usage.name()),
        state.usage.health_check().await,
    )];
    let storage_ok = components[0].status != "unhealthy";

    let mut providers = Vec::new();
    for adapter in state.orchestrator.adapters() {
        let kind = adapter.kind().to_string();
        components.push(ComponentHealth::from_check(
            format!("provider:{kind}"),
            adapter.health_check().await,
        ));
        providers.push(kind);
    }

    let (status, code) = if !storage_ok {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    } else if providers.is_empty() || components.iter().any(|c| !c.is_ok()) {
        ("degraded", StatusCode::OK)
    } else {
        ("ok", StatusCode::OK)
    };
    if status != "ok" {
        warn!(status, "health check reported problems");
    }

    let body = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started.elapsed().as_secs(),
        providers,
        components,
    };
    (code, Json(body)).into_response()
}

/// Runs the `switchyard serve` command until SIGINT/SIGTERM.
///
/// The runtime is shut down even when the listener fails to start.
pub async fn run_serve(runtime: Runtime) -> Result<(), SwitchyardError> {
    let served = serve_until_stopped(&runtime).await;
    if served.is_ok() {
        info!("server stopped accepting requests; flushing usage");
    }
    runtime.finish(served).await
}

async fn serve_until_stopped(runtime: &Runtime) -> Result<(), SwitchyardError> {
    let state = AppState::new(runtime.orchestrator.clone(), runtime.storage.clone());
    let app = router(state);

    let addr = format!("{}:{}", runtime.config.gateway.host, runtime.config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SwitchyardError::Internal(format!("failed to bind {addr}: {e}")))?;
    info!("switchyard listening on {addr}");

    let stop: CancellationToken = shutdown::install_signal_handler();
    axum::serve(listener, app)
        .with_graceful_shutdown(stop.cancelled_owned())
        .await
        .map_err(|e| SwitchyardError::Internal(format!("server error: {e}")))
}
