use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice header (`dbo_invnum`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub created_at: NaiveDateTime,
}

/// Invoice line (`invlines`), owned by exactly one invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub invoice_id: i64,
    pub item_name: String,
    pub item_code: Option<String>,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: Decimal,
    pub tax_rate: Option<Decimal>,
    pub discount: Option<Decimal>,
}

impl LineItem {
    /// quantity × unit price, keeping the price's scale. `None` when the
    /// product does not fit in a `Decimal`.
    pub fn total_price(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.price)
    }
}

/// Result of one fiscalization call (`fiscal_data`).
///
/// The stored foreign key points at a line item, not at the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalRecord {
    pub id: i64,
    pub line_item_id: i64,
    pub qr_code_path: String,
    pub signature: String,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub item_name: String,
    pub item_code: Option<String>,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: Decimal,
    pub tax_rate: Option<Decimal>,
    pub discount: Option<Decimal>,
}
