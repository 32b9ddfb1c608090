use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use shared::AppError;
use thiserror::Error;

use crate::api::invoices::models::{ErrorResponse, MessageResponse};

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Error, Debug)]
pub enum FiscalizationError {
    #[error("No invoices selected!")]
    NoInvoicesSelected,

    #[error("Invoice ID {invoice_id} not found!")]
    InvoiceNotFound { invoice_id: i64 },

    #[error("No invoices found for today.")]
    NoInvoicesToday,

    #[error("{message}")]
    ProcessingError { message: String },

    /// Failure on the way to the device or in its answer.
    #[error("{message}")]
    DeviceError { message: String },

    #[error("Database error: {message}")]
    DatabaseError { message: String },
}

// ============================================================================
// HTTP RESPONSE CONVERSION
// ============================================================================

impl FiscalizationError {
    /// Outcome label for `invoices_fiscalized_total`.
    pub fn metric_label(&self) -> &'static str {
        match self {
            FiscalizationError::InvoiceNotFound { .. } => "not_found",
            FiscalizationError::DeviceError { .. } => "device_error",
            _ => "error",
        }
    }
}

impl IntoResponse for FiscalizationError {
    fn into_response(self) -> Response {
        let text = self.to_string();
        let status = match &self {
            FiscalizationError::NoInvoicesSelected => StatusCode::BAD_REQUEST,
            FiscalizationError::InvoiceNotFound { .. } | FiscalizationError::NoInvoicesToday => {
                StatusCode::NOT_FOUND
            }
            FiscalizationError::ProcessingError { .. }
            | FiscalizationError::DeviceError { .. }
            | FiscalizationError::DatabaseError { .. } => {
                tracing::error!("Fiscalization request failed: {}", text);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Un día vacío se informa como mensaje, no como error.
        if matches!(self, FiscalizationError::NoInvoicesToday) {
            return (status, Json(MessageResponse { message: text })).into_response();
        }

        (status, Json(ErrorResponse { error: text })).into_response()
    }
}

// ============================================================================
// CONVERSION FROM OTHER ERROR TYPES
// ============================================================================

impl From<sqlx::Error> for FiscalizationError {
    fn from(err: sqlx::Error) -> Self {
        FiscalizationError::DatabaseError {
            message: err.to_string(),
        }
    }
}

/// Keeps the raw text. Both variants answer 500; they only differ in metrics.
impl From<AppError> for FiscalizationError {
    fn from(err: AppError) -> Self {
        let message = err.to_string();
        if err.is_downstream() {
            FiscalizationError::DeviceError { message }
        } else {
            FiscalizationError::ProcessingError { message }
        }
    }
}
