// ============================================================================
// HEALTH & PROMETHEUS METRICS ENDPOINTS
// ============================================================================

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use prometheus::{Encoder, TextEncoder};
use shared::HealthStatus;
use std::sync::Arc;

use crate::db::check_db_health;
use crate::state::AppState;

/// `/metrics`, usable with any router state.
pub fn metrics_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(metrics_handler))
}

/// `/health` for a service with nothing to check.
pub fn static_health_router<S>(service: &'static str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(move || async move { Json(HealthStatus::healthy(service)) }))
}

/// Health del cliente: depende de que la base de datos responda.
pub async fn client_health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if check_db_health(&state.db_pool).await {
        (StatusCode::OK, Json(HealthStatus::healthy("fiscal_invoices")))
    } else {
        tracing::warn!("Health check failed: invoice database not responding");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus::unhealthy("fiscal_invoices")),
        )
    }
}

/// Handler para el endpoint /metrics de Prometheus
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}
