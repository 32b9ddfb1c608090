// Fiscal device domain: the stateless service that stamps invoices with a
// QR artifact and a signature.

pub mod handlers;
pub mod service;

pub use handlers::*;
pub use service::FiscalDeviceService;

use axum::{routing::post, Router};
use std::sync::Arc;
use crate::state::DeviceState;

/// Create the fiscal device router
pub fn create_fiscal_device_router() -> Router<Arc<DeviceState>> {
    Router::new()
        .route("/fiscalize", post(fiscalize_handler))
}
