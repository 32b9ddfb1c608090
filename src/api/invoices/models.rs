use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Invoice;

// ============================================================================
// REQUEST/RESPONSE MODELS
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProcessInvoicesRequest {
    #[validate(required, length(min = 1))]
    pub selected_invoices: Option<Vec<i64>>,
}

/// One row of `GET /invoices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub id: i64,
    pub invoice_number: String,
    pub customer_name: String,
    pub total_amount: String,
    pub created_at: String,
}

impl From<&Invoice> for InvoiceSummary {
    fn from(invoice: &Invoice) -> Self {
        InvoiceSummary {
            id: invoice.id,
            invoice_number: invoice.invoice_number.clone(),
            customer_name: invoice.customer_name.clone(),
            total_amount: invoice.total_amount.to_string(),
            created_at: invoice.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
