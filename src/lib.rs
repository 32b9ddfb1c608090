use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod domains;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;
pub mod state;

use api::create_api_router;
use domains::fiscal_device::create_fiscal_device_router;
use observability::{client_health_handler, metrics_middleware, metrics_router, static_health_router};
use security::{get_cors_layer, security_headers_middleware};
use state::{AppState, DeviceState};

use axum::middleware as axum_middleware;

/// Router del servicio cliente: listado del día y fiscalización por lotes.
pub fn create_app_router(app_state: Arc<AppState>) -> Router {
    let body_limit = app_state.config.app.max_request_size_mb * 1024 * 1024;

    Router::new()
        // Endpoints de monitoreo - /health consulta la base de datos
        .route("/health", get(client_health_handler))
        .merge(metrics_router())
        .merge(create_api_router())
        .with_state(app_state)
        .layer(axum_middleware::from_fn(metrics_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(get_cors_layer())
        .layer(axum_middleware::from_fn(security_headers_middleware))
}

/// Router del dispositivo fiscal. Also serves the generated QR images.
pub fn create_device_router(device_state: Arc<DeviceState>) -> Router {
    let body_limit = device_state.config.app.max_request_size_mb * 1024 * 1024;
    let qr_dir = ServeDir::new(device_state.fiscal_service.qr_generator().output_dir());

    Router::new()
        .merge(create_fiscal_device_router())
        .nest_service("/static/qr_codes", qr_dir)
        .merge(static_health_router("fiscal_device"))
        .merge(metrics_router())
        .with_state(device_state)
        .layer(axum_middleware::from_fn(metrics_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(get_cors_layer())
        .layer(axum_middleware::from_fn(security_headers_middleware))
}
