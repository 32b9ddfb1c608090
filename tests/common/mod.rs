#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Local, NaiveDateTime};
use fiscal_invoices::{
    api::invoices::repository::{insert_invoice, insert_line_item},
    create_app_router,
    db::{create_db_pool, run_migrations},
    domains::{
        fiscal_device::FiscalDeviceService,
        qr::{QrConfig, QrGenerator},
    },
    models::{NewInvoice, NewLineItem},
    services::{FiscalDevice, LocalFiscalDevice, RemoteFiscalDevice},
    state::AppState,
};
use rust_decimal::Decimal;
use shared::{config::DatabaseConfig, Config, FiscalDeviceClient};
use sqlx::SqlitePool;
use std::{path::PathBuf, str::FromStr, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt;

pub async fn memory_pool() -> SqlitePool {
    let pool = create_db_pool(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        acquire_timeout_seconds: 5,
    })
    .await
    .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

/// Scratch directory removed when the guard drops. QR output goes to its
/// `qr_codes` subdirectory so tests can check it was never created.
pub fn temp_qr_dir() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let qr_dir = dir.path().join("qr_codes");
    (dir, qr_dir)
}

pub fn test_config(qr_dir: PathBuf) -> Config {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.qr.output_dir = qr_dir;
    config
}

/// Client app talking to a device at `device_url` over HTTP.
pub fn remote_app(pool: SqlitePool, device_url: String) -> Router {
    remote_app_with_timeout(pool, device_url, 5)
}

pub fn remote_app_with_timeout(pool: SqlitePool, device_url: String, timeout_seconds: u64) -> Router {
    let client = FiscalDeviceClient::new(device_url, timeout_seconds).unwrap();
    let device: Arc<dyn FiscalDevice> = Arc::new(RemoteFiscalDevice::new(client));
    // Nothing is written on the client side, the default QR directory is never touched.
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    create_app_router(Arc::new(AppState::with_parts(pool, device, config)))
}

/// Client app with the device running in-process.
pub fn local_app(pool: SqlitePool, qr_dir: PathBuf) -> Router {
    let generator = QrGenerator::new(QrConfig::with_output_dir(&qr_dir));
    let device: Arc<dyn FiscalDevice> =
        Arc::new(LocalFiscalDevice::new(FiscalDeviceService::new(generator)));
    create_app_router(Arc::new(AppState::with_parts(pool, device, test_config(qr_dir))))
}

pub fn line(name: &str, quantity: i64, price: &str) -> NewLineItem {
    NewLineItem {
        item_name: name.to_string(),
        item_code: None,
        description: None,
        quantity,
        price: Decimal::from_str(price).unwrap(),
        tax_rate: None,
        discount: None,
    }
}

pub async fn seed_invoice(
    pool: &SqlitePool,
    number: &str,
    created_at: NaiveDateTime,
    lines: &[NewLineItem],
) -> i64 {
    let total: Decimal = lines
        .iter()
        .map(|l| Decimal::from(l.quantity).checked_mul(l.price).unwrap_or_default())
        .sum();
    let invoice_id = insert_invoice(
        pool,
        &NewInvoice {
            invoice_number: number.to_string(),
            customer_name: "Ana".to_string(),
            total_amount: total,
            created_at,
        },
    )
    .await
    .unwrap();

    for l in lines {
        insert_line_item(pool, invoice_id, l).await.unwrap();
    }
    invoice_id
}

pub async fn seed_today(pool: &SqlitePool, number: &str, lines: &[NewLineItem]) -> i64 {
    seed_invoice(pool, number, Local::now().naive_local(), lines).await
}

pub async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: impl Into<Body>) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn json_body(response: Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
