use async_trait::async_trait;
use shared::{FiscalDeviceClient, FiscalResult, FiscalizeRequest, Result};
use std::time::Instant;

use crate::domains::fiscal_device::FiscalDeviceService;
use crate::observability::record_device_call;

/// The client's view of a fiscal device.
#[async_trait]
pub trait FiscalDevice: Send + Sync {
    /// Short label used in logs and metrics.
    fn name(&self) -> &'static str;

    async fn fiscalize(&self, request: &FiscalizeRequest) -> Result<FiscalResult>;
}

/// Device reached over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteFiscalDevice {
    client: FiscalDeviceClient,
}

impl RemoteFiscalDevice {
    pub fn new(client: FiscalDeviceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FiscalDevice for RemoteFiscalDevice {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn fiscalize(&self, request: &FiscalizeRequest) -> Result<FiscalResult> {
        let start = Instant::now();
        let result = self.client.fiscalize(request).await;
        record_device_call(self.name(), start.elapsed().as_secs_f64(), result.is_ok());
        result
    }
}

/// Device logic running inside the client process.
#[derive(Debug, Clone)]
pub struct LocalFiscalDevice {
    service: FiscalDeviceService,
}

impl LocalFiscalDevice {
    pub fn new(service: FiscalDeviceService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl FiscalDevice for LocalFiscalDevice {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn fiscalize(&self, request: &FiscalizeRequest) -> Result<FiscalResult> {
        let start = Instant::now();
        // Un FiscalizeRequest tipado ya trae ambos campos.
        let result = self.service.fiscalize(request.invoice_id, request.items.as_slice()).await;
        record_device_call(self.name(), start.elapsed().as_secs_f64(), result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::qr::{QrConfig, QrGenerator};
    use shared::FiscalItem;

    fn widget() -> FiscalItem {
        FiscalItem {
            item_name: "Widget".to_string(),
            item_code: Some("W-1".to_string()),
            description: None,
            quantity: 2,
            price: "5.0".to_string(),
            total_price: "10.0".to_string(),
            tax_rate: None,
            discount: None,
        }
    }

    #[tokio::test]
    async fn test_local_device_stamps_borrowed_request() {
        let dir = tempfile::tempdir().unwrap();
        let device = LocalFiscalDevice::new(FiscalDeviceService::new(QrGenerator::new(
            QrConfig::with_output_dir(dir.path()),
        )));

        let request = FiscalizeRequest::new(5, vec![widget()]);
        let first = device.fiscalize(&request).await.unwrap();
        let second = device.fiscalize(&request).await.unwrap();

        assert_eq!(first.qr_code_path, second.qr_code_path);
        assert!(dir.path().join("fiscalized_invoice_5.png").exists());
        assert_eq!(request.items[0].item_code.as_deref(), Some("W-1"));
    }
}
