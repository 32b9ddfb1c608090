//! Shared library for the fiscal invoice services
//!
//! This library contains the pieces both the client service and the fiscal
//! device service depend on:
//! - Configuration loaded from the environment
//! - The common error taxonomy
//! - Wire types exchanged between the services
//! - The HTTP client used for inter-service calls

pub mod config;
pub mod error;
pub mod service_client;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use service_client::{FiscalDeviceClient, ServiceClient};
pub use types::*;
