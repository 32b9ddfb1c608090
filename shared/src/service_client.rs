//! HTTP client for inter-service communication

use crate::{error::AppError, types::*, Result};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: Client,
    base_url: String,
    service_name: String,
}

impl ServiceClient {
    pub fn new(base_url: String, service_name: String, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_name,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub async fn get<R>(&self, endpoint: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        self.send(self.client.get(self.url(endpoint))).await
    }

    /// POST a JSON body and decode the JSON answer.
    pub async fn post<T, R>(&self, endpoint: &str, body: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(self.client.post(self.url(endpoint)).json(body)).await
    }

    pub async fn health_check(&self) -> Result<HealthStatus> {
        self.get("/health").await
    }

    async fn send<R>(&self, request: RequestBuilder) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = request.send().await.map_err(|e| self.map_reqwest_error(e))?;
        let status = response.status();
        debug!("{} answered HTTP {}", self.service_name, status);

        if !status.is_success() {
            // El cuerpo de error se conserva tal cual para el operador.
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(AppError::external_service(
                &self.service_name,
                format!("HTTP {} - {}", status, error_text),
            ));
        }

        response.json::<R>().await.map_err(|e| {
            AppError::external_service(&self.service_name, format!("Failed to deserialize response: {}", e))
        })
    }

    fn map_reqwest_error(&self, error: reqwest::Error) -> AppError {
        if error.is_timeout() {
            AppError::timeout(format!("Request to {} timed out", self.service_name))
        } else if error.is_connect() {
            AppError::service_unavailable(&self.service_name)
        } else {
            AppError::external_service(&self.service_name, error.to_string())
        }
    }
}

/// Client for the fiscal device service
#[derive(Debug, Clone)]
pub struct FiscalDeviceClient {
    client: ServiceClient,
}

impl FiscalDeviceClient {
    pub const SERVICE_NAME: &'static str = "fiscal-device";

    pub fn new(base_url: String, timeout_seconds: u64) -> Result<Self> {
        let client = ServiceClient::new(base_url, Self::SERVICE_NAME.to_string(), timeout_seconds)?;
        Ok(Self { client })
    }

    /// Sends one invoice to the device and returns the stamped result.
    pub async fn fiscalize(&self, request: &FiscalizeRequest) -> Result<FiscalResult> {
        let response: FiscalizeResponse = self.client.post("/fiscalize", request).await?;

        response
            .into_result()
            .map_err(|message| AppError::external_service(Self::SERVICE_NAME, message))
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.client.health_check().await
    }
}
