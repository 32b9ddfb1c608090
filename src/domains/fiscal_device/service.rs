use rand::Rng;
use serde::Serialize;
use shared::{AppError, FiscalResult};
use tracing::{debug, info};

use crate::domains::qr::QrGenerator;
use crate::observability::record_qr_generated;

/// Simulated fiscal device.
///
/// There is no rejection, expiry or duplicate detection: any request that
/// passed validation is stamped.
#[derive(Debug, Clone)]
pub struct FiscalDeviceService {
    qr_generator: QrGenerator,
}

impl FiscalDeviceService {
    pub fn new(qr_generator: QrGenerator) -> Self {
        Self { qr_generator }
    }

    pub fn qr_generator(&self) -> &QrGenerator {
        &self.qr_generator
    }

    /// Text encoded into the QR image.
    pub fn qr_content<T>(invoice_id: i64, items: &T) -> Result<String, AppError>
    where
        T: Serialize + ?Sized,
    {
        let items_json = serde_json::to_string(items)?;
        Ok(format!("Invoice ID: {}, Items: {}", invoice_id, items_json))
    }

    /// Pseudo-random signature. Not a cryptographic signature of anything.
    pub fn generate_signature() -> String {
        let mut rng = rand::thread_rng();
        format!("Signature-{}", rng.gen_range(10_000_000..=99_999_999u32))
    }

    /// Writes the QR artifact for `invoice_id` and signs the result.
    /// `items` is whatever the caller sent; it is only serialized into the QR text.
    pub async fn fiscalize<T>(&self, invoice_id: i64, items: &T) -> Result<FiscalResult, AppError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let content = Self::qr_content(invoice_id, items)?;
        debug!("Encoding {} bytes of QR content for invoice {}", content.len(), invoice_id);

        let generator = self.qr_generator.clone();
        let path = tokio::task::spawn_blocking(move || generator.encode_to_file(invoice_id, &content))
            .await
            .map_err(|e| AppError::internal(format!("QR generation task failed: {}", e)))?
            .map_err(|e| AppError::qr_generation(format!("invoice {}: {:#}", invoice_id, e)))?;

        record_qr_generated();

        let signature = Self::generate_signature();
        let qr_code_path = path.to_string_lossy().into_owned();

        info!(
            "Invoice {} fiscalized: artifact {}, signature {}",
            invoice_id,
            qr_code_path,
            signature
        );

        Ok(FiscalResult {
            qr_code_path,
            signature,
        })
    }
}
