use axum::{
    extract::{rejection::JsonRejection, Json, State},
    response::Json as ResponseJson,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::state::AppState;

use crate::api::invoices::{
    error_handling::FiscalizationError,
    fiscalization_service::FiscalizationService,
    models::{InvoiceSummary, MessageResponse, ProcessInvoicesRequest},
};

// ============================================================================
// HANDLER FUNCTIONS
// ============================================================================

/// Endpoint: GET /invoices
///
/// Lists the invoices created today, in creation order.
pub async fn list_todays_invoices_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<ResponseJson<Vec<InvoiceSummary>>, FiscalizationError> {
    let service = FiscalizationService::from_state(&app_state);

    let invoices = service.list_todays_invoices().await?;
    debug!("Returning {} invoices for today", invoices.len());

    Ok(ResponseJson(invoices.iter().map(InvoiceSummary::from).collect()))
}

/// Endpoint: POST /process_invoices
///
/// Fiscalizes every selected invoice in order. The first failure ends the
/// batch and earlier invoices keep their fiscal records.
pub async fn process_invoices_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ProcessInvoicesRequest>, JsonRejection>,
) -> Result<ResponseJson<MessageResponse>, FiscalizationError> {
    // Un body ilegible cuenta como selección vacía.
    let Json(request) = payload.map_err(|rejection| {
        warn!("Unreadable selection body: {}", rejection.body_text());
        FiscalizationError::NoInvoicesSelected
    })?;

    request.validate().map_err(|e| {
        debug!("Selection rejected: {}", e);
        FiscalizationError::NoInvoicesSelected
    })?;

    let selected = request.selected_invoices.unwrap_or_default();

    let service = FiscalizationService::from_state(&app_state);
    let records = service.process_invoices(&selected).await?;

    info!("Batch of {} invoices fiscalized", records.len());

    Ok(ResponseJson(MessageResponse {
        message: "Invoices fiscalized successfully!".to_string(),
    }))
}
