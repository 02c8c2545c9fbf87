//! # Orders Client SDK
//!
//! A typed Rust client for the Orders API, plus a provider-simulation
//! helper for posting signed webhooks in demos and local testing.

use reqwest::Client;
use serde::de::DeserializeOwned;

use orders_types::{CreateOrderRequest, PurchaseOrder};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Orders API client.
pub struct OrdersClient {
    base_url: String,
    http: Client,
}

impl OrdersClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Creates a new purchase order.
    pub async fn create_order(
        &self,
        amount: &str,
        metadata: serde_json::Value,
    ) -> Result<PurchaseOrder, ClientError> {
        let amount = amount
            .parse()
            .map_err(|e: orders_types::DomainError| ClientError::InvalidAmount(e.to_string()))?;
        let req = CreateOrderRequest { amount, metadata };
        self.post("/api/orders", &req).await
    }

    /// Gets an order by merchant reference.
    pub async fn get_order(&self, reference: &str) -> Result<PurchaseOrder, ClientError> {
        self.get(&format!("/api/orders/{reference}")).await
    }

    /// Posts a raw provider webhook body with its signature header.
    ///
    /// This is the provider-simulation seam used by the CLI and the e2e
    /// example: the body goes over the wire byte-for-byte, so a signature
    /// computed over it verifies on the other side. Returns true when the
    /// gateway acknowledged the delivery.
    pub async fn post_webhook(&self, raw_body: &str, signature: &str) -> Result<bool, ClientError> {
        let resp = self
            .http
            .post(format!("{}/api/webhooks/provider", self.base_url))
            .header("X-Provider-Signature", signature)
            .header("Content-Type", "application/json")
            .body(raw_body.to_string())
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
