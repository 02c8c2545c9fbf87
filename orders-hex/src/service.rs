//! Order Application Service
//!
//! Orchestrates domain operations through the repository port.
//! Contains NO infrastructure logic - pure business orchestration.

use orders_types::{AppError, CreateOrderRequest, OrderRepository, ProviderEvent, PurchaseOrder};

use crate::webhook::{self, WebhookDisposition};

/// Application service for the purchase-order gateway.
///
/// Generic over `R: OrderRepository` - the adapter is injected at compile
/// time. This enables:
/// - Swapping repositories without code changes
/// - Testing with the in-memory repo
/// - Compile-time checks for port implementation
///
/// The provider webhook secret is injected as an explicit value rather than
/// read from ambient process state, so tests run with deterministic secrets.
pub struct OrderService<R: OrderRepository> {
    repo: R,
    webhook_secret: String,
}

impl<R: OrderRepository> OrderService<R> {
    /// Creates a new order service with the given repository and shared
    /// provider webhook secret.
    pub fn new(repo: R, webhook_secret: impl Into<String>) -> Self {
        Self {
            repo,
            webhook_secret: webhook_secret.into(),
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Creates a new purchase order.
    pub async fn create_order(&self, req: CreateOrderRequest) -> Result<PurchaseOrder, AppError> {
        // Business validation; TokenAmount is already non-negative by construction.
        if req.amount.is_zero() {
            return Err(AppError::BadRequest("Amount must be positive".into()));
        }

        self.repo
            .create_order(req.amount, req.metadata)
            .await
            .map_err(Into::into)
    }

    /// Looks a purchase order up by its merchant reference.
    pub async fn get_order(&self, reference: &str) -> Result<PurchaseOrder, AppError> {
        self.repo
            .find_by_reference(reference)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Order {reference}"))))
    }

    /// Handles a provider webhook delivery.
    ///
    /// The signature is verified over the raw body bytes BEFORE anything is
    /// parsed; unauthenticated input is never interpreted. Verification
    /// failure is terminal for the request and produces no state change.
    pub async fn handle_webhook(
        &self,
        raw_body: &[u8],
        signature_header: Option<&str>,
    ) -> Result<WebhookDisposition, AppError> {
        let signature = signature_header.unwrap_or_default();
        if !orders_repo::security::verify_webhook_signature(
            raw_body,
            signature,
            &self.webhook_secret,
        ) {
            tracing::warn!("Invalid webhook signature");
            return Err(AppError::InvalidSignature);
        }

        let event: ProviderEvent = serde_json::from_slice(raw_body)
            .map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {e}")))?;

        webhook::reconcile(&self.repo, event).await
    }
}
