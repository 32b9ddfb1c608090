use shared::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Schema embedded from `migrations/` at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Crea el pool de conexiones SQLite para facturas y datos fiscales.
///
/// Foreign keys are switched on for every connection so `fiscal_data` can
/// only point at existing line items. File databases use WAL; in-memory ones
/// keep SQLite's default journal.
pub async fn create_db_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!(
        "🔌 Connecting to invoice database ({} max connections)...",
        config.max_connections
    );

    let mut options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    if !config.url.contains(":memory:") {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .idle_timeout(Duration::from_secs(600)) // 10 minutos
        .max_lifetime(Duration::from_secs(1800)) // 30 minutos
        .connect_with(options)
        .await?;

    tracing::info!("✅ Invoice database pool created successfully");

    Ok(pool)
}

/// Applies pending migrations. Safe to call on every startup.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("📦 Running database migrations...");
    MIGRATOR.run(pool).await?;
    tracing::info!("✅ Database migrations applied");
    Ok(())
}

/// Verifica la salud de la conexión
pub async fn check_db_health(pool: &SqlitePool) -> bool {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .is_ok()
}
