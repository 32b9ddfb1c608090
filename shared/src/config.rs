//! Configuration management for both services

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub device: DeviceConfig,
    pub qr: QrStorageConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// How the client reaches the fiscal device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceMode {
    /// HTTP calls to a separately running device service.
    Remote,
    /// Device logic runs inside the client process.
    Local,
}

impl FromStr for DeviceMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(DeviceMode::Remote),
            "local" => Ok(DeviceMode::Local),
            other => Err(anyhow::anyhow!(
                "FISCAL_DEVICE_MODE must be 'remote' or 'local', got '{}'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub mode: DeviceMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrStorageConfig {
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub log_level: String,
    pub client_port: u16,
    pub device_port: u16,
    pub max_request_size_mb: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: DatabaseConfig {
                url: "sqlite://fiscal_invoices.db".to_string(),
                max_connections: 5,
                min_connections: 1,
                acquire_timeout_seconds: 30,
            },
            device: DeviceConfig {
                url: "http://localhost:5001".to_string(),
                timeout_seconds: 30,
                mode: DeviceMode::Remote,
            },
            qr: QrStorageConfig {
                output_dir: PathBuf::from("static/qr_codes"),
            },
            app: AppConfig {
                environment: "development".to_string(),
                log_level: "info".to_string(),
                client_port: 5000,
                device_port: 5001,
                max_request_size_mb: 2,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://fiscal_invoices.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()?,
                acquire_timeout_seconds: env::var("DATABASE_ACQUIRE_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            },
            device: DeviceConfig {
                url: env::var("FISCAL_DEVICE_URL")
                    .unwrap_or_else(|_| "http://localhost:5001".to_string()),
                timeout_seconds: env::var("FISCAL_DEVICE_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
                mode: env::var("FISCAL_DEVICE_MODE")
                    .unwrap_or_else(|_| "remote".to_string())
                    .parse()?,
            },
            qr: QrStorageConfig {
                output_dir: env::var("QR_CODES_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("static/qr_codes")),
            },
            app: AppConfig {
                environment: env::var("ENVIRONMENT")
                    .unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "info".to_string()),
                client_port: env::var("PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()?,
                device_port: env::var("DEVICE_PORT")
                    .unwrap_or_else(|_| "5001".to_string())
                    .parse()?,
                max_request_size_mb: env::var("MAX_REQUEST_SIZE_MB")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()?,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }
}
