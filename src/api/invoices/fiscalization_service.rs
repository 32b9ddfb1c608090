use chrono::{Local, NaiveDate};
use shared::{AppError, FiscalItem, FiscalizeRequest};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::api::invoices::{
    error_handling::FiscalizationError,
    repository::{get_invoice_by_id, get_invoice_items, list_invoices_created_on, save_fiscal_data},
};
use crate::models::{FiscalRecord, Invoice, LineItem};
use crate::observability::record_invoice_fiscalization;
use crate::services::FiscalDevice;
use crate::state::AppState;

// ============================================================================
// PAYLOAD BUILDING
// ============================================================================

/// Formats line items for the device. Amounts become decimal text.
pub fn format_items_for_fiscalization(items: &[LineItem]) -> Result<Vec<FiscalItem>, FiscalizationError> {
    items
        .iter()
        .map(|item| {
            let total_price = item.total_price().ok_or_else(|| FiscalizationError::ProcessingError {
                message: format!(
                    "line total overflows for item {} ({} x {})",
                    item.id, item.quantity, item.price
                ),
            })?;

            Ok(FiscalItem {
                item_name: item.item_name.clone(),
                item_code: item.item_code.clone(),
                description: item.description.clone(),
                quantity: item.quantity,
                price: item.price.to_string(),
                total_price: total_price.to_string(),
                tax_rate: item.tax_rate.map(|rate| rate.to_string()),
                discount: item.discount.map(|discount| discount.to_string()),
            })
        })
        .collect()
}

pub fn build_fiscalize_request(invoice_id: i64, items: &[LineItem]) -> Result<FiscalizeRequest, FiscalizationError> {
    Ok(FiscalizeRequest::new(invoice_id, format_items_for_fiscalization(items)?))
}

// ============================================================================
// WORKFLOW
// ============================================================================

/// Client-side fiscalization workflow.
pub struct FiscalizationService {
    pool: SqlitePool,
    device: Arc<dyn FiscalDevice>,
}

impl FiscalizationService {
    pub fn new(pool: SqlitePool, device: Arc<dyn FiscalDevice>) -> Self {
        Self { pool, device }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db_pool.clone(), state.fiscal_device.clone())
    }

    /// Invoices created on the server's current local date.
    pub async fn list_todays_invoices(&self) -> Result<Vec<Invoice>, FiscalizationError> {
        self.list_invoices_for(Local::now().date_naive()).await
    }

    pub async fn list_invoices_for(&self, date: NaiveDate) -> Result<Vec<Invoice>, FiscalizationError> {
        let invoices = list_invoices_created_on(&self.pool, date).await?;
        if invoices.is_empty() {
            return Err(FiscalizationError::NoInvoicesToday);
        }
        Ok(invoices)
    }

    /// Fiscalizes the selected invoices in order and stops at the first
    /// failure. Invoices handled before the failure stay committed.
    pub async fn process_invoices(&self, selected_ids: &[i64]) -> Result<Vec<FiscalRecord>, FiscalizationError> {
        if selected_ids.is_empty() {
            return Err(FiscalizationError::NoInvoicesSelected);
        }

        info!(
            "Processing {} selected invoices via {} fiscal device",
            selected_ids.len(),
            self.device.name()
        );

        let mut records = Vec::with_capacity(selected_ids.len());

        for &invoice_id in selected_ids {
            let invoice = match get_invoice_by_id(&self.pool, invoice_id).await? {
                Some(invoice) => invoice,
                None => {
                    warn!("Invoice {} not found, stopping batch after {} processed", invoice_id, records.len());
                    record_invoice_fiscalization("not_found");
                    return Err(FiscalizationError::InvoiceNotFound { invoice_id });
                }
            };

            match self.process_invoice(&invoice).await {
                Ok(record) => {
                    record_invoice_fiscalization("success");
                    records.push(record);
                }
                Err(e) => {
                    error!(
                        "Fiscalization of invoice {} failed, stopping batch after {} processed: {}",
                        invoice_id,
                        records.len(),
                        e
                    );
                    record_invoice_fiscalization(e.metric_label());
                    return Err(e);
                }
            }
        }

        info!("Fiscalized {} invoices", records.len());
        Ok(records)
    }

    /// Loads the items, calls the device and stores the result against the
    /// invoice's first line item.
    pub async fn process_invoice(&self, invoice: &Invoice) -> Result<FiscalRecord, FiscalizationError> {
        debug!("Phase 1: Loading line items for invoice {}", invoice.id);
        let items = get_invoice_items(&self.pool, invoice.id).await?;

        // fiscal_data.invid references invlines.id, so there must be a line to point at.
        let anchor_line_id = items.first().map(|item| item.id).ok_or_else(|| {
            FiscalizationError::ProcessingError {
                message: format!("Invoice ID {} has no line items to fiscalize", invoice.id),
            }
        })?;

        debug!("Phase 2: Calling fiscal device with {} items", items.len());
        let request = build_fiscalize_request(invoice.id, &items)?;
        let result = self.device.fiscalize(&request).await?;

        if result.signature.is_empty() {
            return Err(AppError::external_service(
                shared::FiscalDeviceClient::SERVICE_NAME,
                "fiscal device returned an empty signature",
            )
            .into());
        }

        debug!("Phase 3: Saving fiscal data");
        let record_id = save_fiscal_data(&self.pool, anchor_line_id, &result.qr_code_path, &result.signature).await?;

        info!(
            "Invoice {} ({}) fiscalized: record {}, artifact {}",
            invoice.id, invoice.invoice_number, record_id, result.qr_code_path
        );

        Ok(FiscalRecord {
            id: record_id,
            line_item_id: anchor_line_id,
            qr_code_path: result.qr_code_path,
            signature: result.signature,
        })
    }
}
