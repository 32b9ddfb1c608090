// Inserta facturas de demostración con fecha de hoy.
//
// Usage: seed_invoices [COUNT]   (default 3)

use anyhow::{Context, Result};
use chrono::{Duration, Local};
use fiscal_invoices::{
    api::invoices::repository::{insert_invoice, insert_line_item},
    db::{create_db_pool, run_migrations},
    models::{NewInvoice, NewLineItem},
};
use rand::Rng;
use rust_decimal::Decimal;
use shared::Config;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const CUSTOMERS: [&str; 4] = ["Ana Pérez", "Luis Gómez", "Comercial del Istmo", "María Rodríguez"];
const PRODUCTS: [(&str, &str, i64); 5] = [
    ("Café molido 500g", "CAF-500", 450),
    ("Arroz 5lb", "ARR-005", 325),
    ("Aceite vegetal 1L", "ACE-001", 399),
    ("Azúcar 2kg", "AZU-002", 210),
    ("Leche entera 1L", "LEC-001", 155),
];

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(&config.app.log_level))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let count: usize = match std::env::args().nth(1) {
        Some(arg) => arg.parse().context("COUNT must be a positive integer")?,
        None => 3,
    };

    let pool = create_db_pool(&config.database).await?;
    run_migrations(&pool).await?;

    let mut rng = rand::thread_rng();
    let now = Local::now().naive_local();

    for n in 0..count {
        let lines: Vec<NewLineItem> = (0..rng.gen_range(1..=3))
            .map(|_| {
                let (name, code, cents) = PRODUCTS[rng.gen_range(0..PRODUCTS.len())];
                NewLineItem {
                    item_name: name.to_string(),
                    item_code: Some(code.to_string()),
                    description: None,
                    quantity: rng.gen_range(1..=4),
                    price: Decimal::new(cents, 2),
                    tax_rate: Some(Decimal::new(7, 2)),
                    discount: None,
                }
            })
            .collect();

        let total: Decimal = lines
            .iter()
            .map(|line| Decimal::from(line.quantity) * line.price)
            .sum();

        // Separadas por segundos para conservar el orden de creación.
        let created_at = now - Duration::seconds((count - n) as i64);

        let invoice_id = insert_invoice(
            &pool,
            &NewInvoice {
                invoice_number: format!("F-{}-{:04}", now.format("%Y%m%d"), n + 1),
                customer_name: CUSTOMERS[n % CUSTOMERS.len()].to_string(),
                total_amount: total,
                created_at,
            },
        )
        .await?;

        for line in &lines {
            insert_line_item(&pool, invoice_id, line).await?;
        }

        info!("🧾 Seeded invoice {} with {} lines, total {}", invoice_id, lines.len(), total);
    }

    info!("✅ {} invoices seeded into {}", count, config.database.url);
    Ok(())
}
