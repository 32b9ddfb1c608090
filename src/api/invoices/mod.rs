// Invoice fiscalization API
// Lists today's invoices and sends selected ones to the fiscal device

pub mod handlers;
pub mod models;
pub mod repository;
pub mod fiscalization_service;
pub mod error_handling;

pub use handlers::*;
pub use models::*;
pub use error_handling::*;
pub use fiscalization_service::FiscalizationService;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use crate::state::AppState;

/// Create the invoice fiscalization router
pub fn create_invoice_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/invoices", get(list_todays_invoices_handler))
        .route("/process_invoices", post(process_invoices_handler))
}
