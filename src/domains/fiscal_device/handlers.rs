use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use serde_json::Value;
use shared::{AppError, FiscalizePayload, FiscalizeResponse};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn, error};
use validator::Validate;

use crate::state::DeviceState;

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Invalid request data: {reason}")]
    InvalidRequest { reason: String },

    #[error("Fiscalization failed: {message}")]
    FiscalizationFailed { message: String },
}

impl IntoResponse for DeviceError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            DeviceError::InvalidRequest { reason } => {
                warn!("Rejected fiscalization request: {}", reason);
                (StatusCode::BAD_REQUEST, FiscalizeResponse::error("Invalid request data!"))
            }
            DeviceError::FiscalizationFailed { message } => {
                error!("Fiscalization failed: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, FiscalizeResponse::error(message))
            }
        };

        (status, ResponseJson(body)).into_response()
    }
}

impl From<AppError> for DeviceError {
    fn from(err: AppError) -> Self {
        if err.status_code() == StatusCode::BAD_REQUEST {
            DeviceError::InvalidRequest { reason: err.to_string() }
        } else {
            DeviceError::FiscalizationFailed { message: err.to_string() }
        }
    }
}

/// Checks that both fields are present and returns them. The items are not
/// inspected further.
pub fn validate_fiscalize_request(payload: &FiscalizePayload) -> Result<(i64, &Value), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    match (payload.invoice_id, payload.items.as_ref()) {
        (Some(invoice_id), Some(items)) => Ok((invoice_id, items)),
        _ => Err(AppError::validation("invoice_id and items are required")),
    }
}

// ============================================================================
// HANDLER FUNCTIONS
// ============================================================================

/// Endpoint: POST /fiscalize
///
/// Stamps an invoice with a QR artifact and a signature.
pub async fn fiscalize_handler(
    State(state): State<Arc<DeviceState>>,
    payload: Result<Json<FiscalizePayload>, JsonRejection>,
) -> Result<ResponseJson<FiscalizeResponse>, DeviceError> {
    let Json(payload) = payload.map_err(|rejection| DeviceError::InvalidRequest {
        reason: rejection.body_text(),
    })?;

    let (invoice_id, items) = validate_fiscalize_request(&payload)?;

    info!("Fiscalizing invoice {}", invoice_id);

    let result = state.fiscal_service.fiscalize(invoice_id, items).await?;

    Ok(ResponseJson(FiscalizeResponse::success(result.qr_code_path, result.signature)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_response() {
        let error = DeviceError::InvalidRequest {
            reason: "items is required".to_string(),
        };

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_failure_response() {
        let error = DeviceError::from(AppError::qr_generation("disk full"));

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_maps_to_invalid_request() {
        let error = DeviceError::from(AppError::validation("items is required"));
        assert!(matches!(error, DeviceError::InvalidRequest { .. }));
    }

    #[test]
    fn test_validate_fiscalize_request() {
        assert!(validate_fiscalize_request(&FiscalizePayload::default()).is_err());
        assert!(validate_fiscalize_request(&FiscalizePayload {
            invoice_id: Some(1),
            items: None,
        })
        .is_err());

        let payload = FiscalizePayload {
            invoice_id: Some(9),
            items: Some(serde_json::json!([{ "name": "x", "qty": 1 }])),
        };
        let (invoice_id, items) = validate_fiscalize_request(&payload).unwrap();
        assert_eq!(invoice_id, 9);
        assert_eq!(items[0]["name"], "x");
    }
}
