//! Wire types exchanged between the client and the fiscal device

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One invoice line as the device sees it. Amounts travel as decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalItem {
    pub item_name: String,
    pub item_code: Option<String>,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: String,
    pub total_price: String,
    pub tax_rate: Option<String>,
    pub discount: Option<String>,
}

/// Body the client sends to `POST /fiscalize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalizeRequest {
    pub invoice_id: i64,
    pub items: Vec<FiscalItem>,
}

impl FiscalizeRequest {
    pub fn new(invoice_id: i64, items: Vec<FiscalItem>) -> Self {
        Self { invoice_id, items }
    }
}

/// Body of `POST /fiscalize` as the device reads it.
///
/// The device only checks that both fields are present. `items` is kept as
/// raw JSON and goes into the QR text untouched, whatever its shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FiscalizePayload {
    #[validate(required(message = "invoice_id is required"))]
    pub invoice_id: Option<i64>,
    #[validate(required(message = "items is required"))]
    pub items: Option<serde_json::Value>,
}

/// Body returned by `POST /fiscalize`.
///
/// Fields are optional so the client can tell a malformed reply apart from a
/// transport failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiscalizeResponse {
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FiscalizeResponse {
    pub fn success(qr_code_path: String, signature: String) -> Self {
        Self {
            status: Some("success".to_string()),
            qr_code_path: Some(qr_code_path),
            signature: Some(signature),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Some("error".to_string()),
            qr_code_path: None,
            signature: None,
            message: Some(message.into()),
        }
    }

    /// Extracts the artifact path and signature, naming the first field that
    /// is missing or unusable.
    pub fn into_result(self) -> Result<FiscalResult, String> {
        match self.status.as_deref() {
            Some("success") => {}
            Some(other) => return Err(format!("fiscal device returned status '{}'", other)),
            None => return Err("fiscal device response is missing 'status'".to_string()),
        }

        let qr_code_path = self
            .qr_code_path
            .filter(|path| !path.is_empty())
            .ok_or_else(|| "fiscal device response is missing 'qr_code_path'".to_string())?;
        let signature = self
            .signature
            .filter(|signature| !signature.is_empty())
            .ok_or_else(|| "fiscal device response is missing 'signature'".to_string())?;

        Ok(FiscalResult {
            qr_code_path,
            signature,
        })
    }
}

/// Artifact reference and signature produced by a successful fiscalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalResult {
    pub qr_code_path: String,
    pub signature: String,
}

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn healthy(service: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn unhealthy(service: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            service: service.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_requires_both_fields() {
        let missing_items: FiscalizePayload = serde_json::from_str(r#"{"invoice_id": 42}"#).unwrap();
        assert!(missing_items.validate().is_err());

        let null_items: FiscalizePayload =
            serde_json::from_str(r#"{"invoice_id": 42, "items": null}"#).unwrap();
        assert!(null_items.validate().is_err());

        let missing_id: FiscalizePayload = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(missing_id.validate().is_err());
    }

    #[test]
    fn test_payload_accepts_any_item_shape() {
        let payload: FiscalizePayload =
            serde_json::from_str(r#"{"invoice_id": 5, "items": [{"name": "x", "qty": 1}]}"#).unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.items.unwrap()[0]["qty"], 1);
    }

    #[test]
    fn test_client_request_reads_as_payload() {
        let request = FiscalizeRequest::new(
            9,
            vec![FiscalItem {
                item_name: "Widget".to_string(),
                item_code: None,
                description: None,
                quantity: 2,
                price: "5.0".to_string(),
                total_price: "10.0".to_string(),
                tax_rate: None,
                discount: None,
            }],
        );

        let payload: FiscalizePayload =
            serde_json::from_value(serde_json::to_value(&request).unwrap()).unwrap();
        assert_eq!(payload.invoice_id, Some(9));
        assert_eq!(payload.items.unwrap()[0]["total_price"], "10.0");
    }

    #[test]
    fn test_response_without_signature_is_rejected() {
        let response: FiscalizeResponse = serde_json::from_str(
            r#"{"status":"success","qr_code_path":"static/qr_codes/fiscalized_invoice_1.png"}"#,
        )
        .unwrap();

        let error = response.into_result().unwrap_err();
        assert!(error.contains("signature"));
    }

    #[test]
    fn test_error_status_is_rejected() {
        let error = FiscalizeResponse::error("Invalid request data!")
            .into_result()
            .unwrap_err();
        assert!(error.contains("'error'"));
    }

    #[test]
    fn test_success_response_serializes_without_message() {
        let json = serde_json::to_value(FiscalizeResponse::success(
            "static/qr_codes/fiscalized_invoice_7.png".to_string(),
            "Signature-12345678".to_string(),
        ))
        .unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["signature"], "Signature-12345678");
        assert!(json.get("message").is_none());
    }
}
