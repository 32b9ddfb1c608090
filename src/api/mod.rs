pub mod invoices;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new().merge(invoices::create_invoice_router())
}
