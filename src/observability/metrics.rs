// ============================================================================
// PROMETHEUS METRICS
// ============================================================================

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

lazy_static! {
    // ========================================================================
    // HTTP REQUEST METRICS
    // ========================================================================

    /// Total de requests HTTP por método, endpoint y status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "endpoint", "status"]
    )
    .unwrap();

    /// Duración de requests HTTP en segundos
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "endpoint"],
        vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // ========================================================================
    // FISCALIZATION METRICS
    // ========================================================================

    /// Invoices run through the fiscalization workflow, by outcome
    pub static ref INVOICES_FISCALIZED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "invoices_fiscalized_total",
        "Total invoices processed by the fiscalization workflow",
        &["status"]
    )
    .unwrap();

    /// Calls to the fiscal device
    pub static ref DEVICE_CALL_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "fiscal_device_call_duration_seconds",
        "Fiscal device call duration in seconds",
        &["device", "status"],
        vec![0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 30.0]
    )
    .unwrap();

    /// QR artifacts written to disk
    pub static ref QR_ARTIFACTS_GENERATED_TOTAL: IntCounter = register_int_counter!(
        "qr_artifacts_generated_total",
        "Total QR artifact files written"
    )
    .unwrap();
}

fn status_label(success: bool) -> &'static str {
    if success { "success" } else { "error" }
}

/// Helper para registrar una request HTTP
pub fn record_http_request(method: &str, endpoint: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration_secs);
}

/// `status` is `success` or a `FiscalizationError::metric_label()`.
pub fn record_invoice_fiscalization(status: &str) {
    INVOICES_FISCALIZED_TOTAL.with_label_values(&[status]).inc();
}

pub fn record_device_call(device: &str, duration_secs: f64, success: bool) {
    DEVICE_CALL_DURATION_SECONDS
        .with_label_values(&[device, status_label(success)])
        .observe(duration_secs);
}

pub fn record_qr_generated() {
    QR_ARTIFACTS_GENERATED_TOTAL.inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_counter_increments() {
        let before = INVOICES_FISCALIZED_TOTAL.with_label_values(&["success"]).get();
        record_invoice_fiscalization("success");
        let after = INVOICES_FISCALIZED_TOTAL.with_label_values(&["success"]).get();

        assert!(after > before);
    }

    #[test]
    fn test_device_call_is_observed() {
        record_device_call("local", 0.02, false);
        let count = DEVICE_CALL_DURATION_SECONDS
            .with_label_values(&["local", "error"])
            .get_sample_count();

        assert!(count >= 1);
    }
}
