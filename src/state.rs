use shared::config::{Config, DeviceMode};
use shared::FiscalDeviceClient;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::db::{create_db_pool, run_migrations};
use crate::domains::fiscal_device::FiscalDeviceService;
use crate::domains::qr::{QrConfig, QrGenerator};
use crate::services::{FiscalDevice, LocalFiscalDevice, RemoteFiscalDevice};

/// Estado compartido del servicio cliente.
///
/// Built once at startup and handed to every handler through axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub fiscal_device: Arc<dyn FiscalDevice>,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = create_db_pool(&config.database).await?;
        run_migrations(&db_pool).await?;

        let fiscal_device: Arc<dyn FiscalDevice> = match config.device.mode {
            DeviceMode::Remote => {
                let client = FiscalDeviceClient::new(
                    config.device.url.clone(),
                    config.device.timeout_seconds,
                )?;

                // Startup continues without the device; each batch reports its own failure.
                match client.health().await {
                    Ok(health) => tracing::info!(
                        "✅ Fiscal device '{}' reachable at {}",
                        health.service,
                        config.device.url
                    ),
                    Err(e) => tracing::warn!(
                        "⚠️ Fiscal device at {} not reachable yet: {}",
                        config.device.url,
                        e
                    ),
                }

                Arc::new(RemoteFiscalDevice::new(client))
            }
            DeviceMode::Local => {
                tracing::info!(
                    "ℹ️ Fiscal device running in-process, QR codes under {}",
                    config.qr.output_dir.display()
                );
                Arc::new(LocalFiscalDevice::new(FiscalDeviceService::new(
                    QrGenerator::new(QrConfig::with_output_dir(&config.qr.output_dir)),
                )))
            }
        };

        Ok(Self::with_parts(db_pool, fiscal_device, config))
    }

    pub fn with_parts(db_pool: SqlitePool, fiscal_device: Arc<dyn FiscalDevice>, config: Config) -> Self {
        AppState {
            db_pool,
            fiscal_device,
            config,
        }
    }
}

/// Estado del servicio de dispositivo fiscal. Holds no mutable data.
#[derive(Clone)]
pub struct DeviceState {
    pub fiscal_service: FiscalDeviceService,
    pub config: Config,
}

impl DeviceState {
    pub fn new(config: Config) -> Self {
        let qr_generator = QrGenerator::new(QrConfig::with_output_dir(&config.qr.output_dir));
        DeviceState {
            fiscal_service: FiscalDeviceService::new(qr_generator),
            config,
        }
    }
}
