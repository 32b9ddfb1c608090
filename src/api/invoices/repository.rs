use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

use crate::models::{FiscalRecord, Invoice, LineItem, NewInvoice, NewLineItem};

// ============================================================================
// ROW MAPPING
// ============================================================================

/// Amounts are stored as TEXT. Rows written by other tools may hold REAL
/// values instead, which SQLite hands back as text through the unchecked read.
fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, sqlx::Error> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get_unchecked(column)?;
    parse_decimal(column, &raw)
}

fn optional_decimal_column(row: &SqliteRow, column: &str) -> Result<Option<Decimal>, sqlx::Error> {
    let raw: Option<String> = row.try_get_unchecked(column)?;
    raw.map(|value| parse_decimal(column, &value)).transpose()
}

fn invoice_from_row(row: &SqliteRow) -> Result<Invoice, sqlx::Error> {
    Ok(Invoice {
        id: row.try_get("id")?,
        invoice_number: row.try_get("invoice_number")?,
        customer_name: row.try_get("customer_name")?,
        total_amount: decimal_column(row, "total_amount")?,
        created_at: row.try_get("created_at")?,
    })
}

fn line_item_from_row(row: &SqliteRow) -> Result<LineItem, sqlx::Error> {
    Ok(LineItem {
        id: row.try_get("id")?,
        invoice_id: row.try_get("invid")?,
        item_name: row.try_get("item_name")?,
        item_code: row.try_get("item_code")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        price: decimal_column(row, "price")?,
        tax_rate: optional_decimal_column(row, "tax_rate")?,
        discount: optional_decimal_column(row, "discount")?,
    })
}

fn fiscal_record_from_row(row: &SqliteRow) -> Result<FiscalRecord, sqlx::Error> {
    Ok(FiscalRecord {
        id: row.try_get("id")?,
        line_item_id: row.try_get("invid")?,
        qr_code_path: row.try_get("qr_code_path")?,
        signature: row.try_get("signature")?,
    })
}

// ============================================================================
// INVOICES
// ============================================================================

/// Invoices whose `created_at` falls on `date`, oldest id first.
pub async fn list_invoices_created_on(
    pool: &SqlitePool,
    date: NaiveDate,
) -> Result<Vec<Invoice>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, invoice_number, customer_name, total_amount, created_at
        FROM dbo_invnum
        WHERE date(created_at) = ?
        ORDER BY id
        "#,
    )
    .bind(date.format("%Y-%m-%d").to_string())
    .fetch_all(pool)
    .await?;

    debug!("Found {} invoices created on {}", rows.len(), date);

    rows.iter().map(invoice_from_row).collect()
}

pub async fn get_invoice_by_id(pool: &SqlitePool, invoice_id: i64) -> Result<Option<Invoice>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, invoice_number, customer_name, total_amount, created_at FROM dbo_invnum WHERE id = ?",
    )
    .bind(invoice_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(invoice_from_row).transpose()
}

pub async fn insert_invoice(pool: &SqlitePool, invoice: &NewInvoice) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO dbo_invnum (invoice_number, customer_name, total_amount, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&invoice.invoice_number)
    .bind(&invoice.customer_name)
    .bind(invoice.total_amount.to_string())
    .bind(invoice.created_at)
    .execute(pool)
    .await?;

    let invoice_id = result.last_insert_rowid();
    info!("Invoice {} stored with id {}", invoice.invoice_number, invoice_id);
    Ok(invoice_id)
}

// ============================================================================
// LINE ITEMS
// ============================================================================

/// Line items of an invoice in insertion order.
pub async fn get_invoice_items(pool: &SqlitePool, invoice_id: i64) -> Result<Vec<LineItem>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, invid, item_name, item_code, description, quantity, price, tax_rate, discount
        FROM invlines
        WHERE invid = ?
        ORDER BY id
        "#,
    )
    .bind(invoice_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(line_item_from_row).collect()
}

pub async fn insert_line_item(
    pool: &SqlitePool,
    invoice_id: i64,
    item: &NewLineItem,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO invlines (invid, item_name, item_code, description, quantity, price, tax_rate, discount)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(invoice_id)
    .bind(&item.item_name)
    .bind(&item.item_code)
    .bind(&item.description)
    .bind(item.quantity)
    .bind(item.price.to_string())
    .bind(item.tax_rate.map(|rate| rate.to_string()))
    .bind(item.discount.map(|discount| discount.to_string()))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

// ============================================================================
// FISCAL DATA
// ============================================================================

/// Inserts one fiscal record. Each call commits on its own.
pub async fn save_fiscal_data(
    pool: &SqlitePool,
    line_item_id: i64,
    qr_code_path: &str,
    signature: &str,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO fiscal_data (invid, qr_code_path, signature) VALUES (?, ?, ?)",
    )
    .bind(line_item_id)
    .bind(qr_code_path)
    .bind(signature)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Fiscal records attached to any line item of the given invoice.
pub async fn list_fiscal_records_for_invoice(
    pool: &SqlitePool,
    invoice_id: i64,
) -> Result<Vec<FiscalRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT f.id, f.invid, f.qr_code_path, f.signature
        FROM fiscal_data f
        JOIN invlines l ON l.id = f.invid
        WHERE l.invid = ?
        ORDER BY f.id
        "#,
    )
    .bind(invoice_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(fiscal_record_from_row).collect()
}

pub async fn count_fiscal_records(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM fiscal_data")
        .fetch_one(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_db_pool, run_migrations};
    use chrono::{Duration, Local, NaiveDateTime};
    use shared::config::DatabaseConfig;

    async fn setup_pool() -> SqlitePool {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout_seconds: 5,
        };
        let pool = create_db_pool(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn invoice(number: &str, created_at: NaiveDateTime) -> NewInvoice {
        NewInvoice {
            invoice_number: number.to_string(),
            customer_name: "ACME Ltd".to_string(),
            total_amount: Decimal::from_str("150.50").unwrap(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_list_invoices_created_on_filters_by_date() {
        let pool = setup_pool().await;
        let now = Local::now().naive_local();

        let today_id = insert_invoice(&pool, &invoice("INV-1", now)).await.unwrap();
        insert_invoice(&pool, &invoice("INV-0", now - Duration::days(1))).await.unwrap();

        let invoices = list_invoices_created_on(&pool, now.date()).await.unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].id, today_id);
        assert_eq!(invoices[0].total_amount.to_string(), "150.50");
    }

    #[tokio::test]
    async fn test_real_amounts_written_by_other_tools_are_read() {
        let pool = setup_pool().await;

        sqlx::query("INSERT INTO dbo_invnum (invoice_number, customer_name, total_amount, created_at) VALUES ('X-1', 'Legacy', 99.5, '2026-01-02 10:00:00')")
            .execute(&pool)
            .await
            .unwrap();

        let invoice = get_invoice_by_id(&pool, 1).await.unwrap().unwrap();
        assert_eq!(invoice.total_amount, Decimal::from_str("99.5").unwrap());
        assert_eq!(invoice.created_at.format("%Y-%m-%d %H:%M:%S").to_string(), "2026-01-02 10:00:00");
    }

    #[tokio::test]
    async fn test_line_items_round_trip_optional_fields() {
        let pool = setup_pool().await;
        let invoice_id = insert_invoice(&pool, &invoice("INV-2", Local::now().naive_local())).await.unwrap();

        insert_line_item(&pool, invoice_id, &NewLineItem {
            item_name: "Coffee".to_string(),
            item_code: Some("C-01".to_string()),
            description: None,
            quantity: 2,
            price: Decimal::from_str("5.0").unwrap(),
            tax_rate: Some(Decimal::from_str("0.07").unwrap()),
            discount: None,
        })
        .await
        .unwrap();

        let items = get_invoice_items(&pool, invoice_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_code.as_deref(), Some("C-01"));
        assert_eq!(items[0].description, None);
        assert_eq!(items[0].price.to_string(), "5.0");
        assert_eq!(items[0].tax_rate.map(|r| r.to_string()), Some("0.07".to_string()));
        assert_eq!(items[0].discount, None);
    }

    #[tokio::test]
    async fn test_unknown_invoice_is_none() {
        let pool = setup_pool().await;
        assert!(get_invoice_by_id(&pool, 404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fiscal_records_are_never_deduplicated() {
        let pool = setup_pool().await;
        let invoice_id = insert_invoice(&pool, &invoice("INV-3", Local::now().naive_local())).await.unwrap();
        let line_id = insert_line_item(&pool, invoice_id, &NewLineItem {
            item_name: "Tea".to_string(),
            item_code: None,
            description: None,
            quantity: 1,
            price: Decimal::from_str("3.00").unwrap(),
            tax_rate: None,
            discount: None,
        })
        .await
        .unwrap();

        save_fiscal_data(&pool, line_id, "static/qr_codes/fiscalized_invoice_1.png", "Signature-1").await.unwrap();
        save_fiscal_data(&pool, line_id, "static/qr_codes/fiscalized_invoice_1.png", "Signature-2").await.unwrap();

        let records = list_fiscal_records_for_invoice(&pool, invoice_id).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.line_item_id == line_id));
        assert_eq!(count_fiscal_records(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_signature_is_rejected_by_store() {
        let pool = setup_pool().await;
        let invoice_id = insert_invoice(&pool, &invoice("INV-4", Local::now().naive_local())).await.unwrap();
        let line_id = insert_line_item(&pool, invoice_id, &NewLineItem {
            item_name: "Tea".to_string(),
            item_code: None,
            description: None,
            quantity: 1,
            price: Decimal::from_str("3.00").unwrap(),
            tax_rate: None,
            discount: None,
        })
        .await
        .unwrap();

        assert!(save_fiscal_data(&pool, line_id, "x.png", "").await.is_err());
    }
}
