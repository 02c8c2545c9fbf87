//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use orders_types::domain::{MerchantRef, OrderId, OrderStatus, PurchaseOrder};
use orders_types::dto::{CreateOrderRequest, WebhookAck};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Create a new purchase order
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = PurchaseOrder),
        (status = 400, description = "Invalid amount")
    )
)]
async fn create_order() {}

/// Get a purchase order by merchant reference
#[utoipa::path(
    get,
    path = "/api/orders/{reference}",
    tag = "orders",
    params(
        ("reference" = String, Path, description = "Merchant reference (PO-XXXXXXXXXX)")
    ),
    responses(
        (status = 200, description = "Order details", body = PurchaseOrder),
        (status = 404, description = "Order not found")
    )
)]
async fn get_order() {}

/// Provider webhook receiver
#[utoipa::path(
    post,
    path = "/api/webhooks/provider",
    tag = "webhooks",
    request_body(content = inline(serde_json::Value), description = "Raw provider event; the X-Provider-Signature header must carry an HMAC-SHA256 hex digest of the exact body bytes"),
    responses(
        (status = 200, description = "Event processed or ignored", body = WebhookAck),
        (status = 400, description = "Signature verification failed or payload malformed"),
        (status = 500, description = "Store unavailable; the provider should retry")
    )
)]
async fn provider_webhook() {}

/// OpenAPI documentation for the Orders API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Purchase Order Gateway API",
        version = "1.0.0",
        description = "Merchant purchase orders denominated in a cryptocurrency token, reconciled against signed payment-provider webhooks.",
        license(name = "MIT"),
    ),
    paths(
        health,
        create_order,
        get_order,
        provider_webhook,
    ),
    components(
        schemas(
            CreateOrderRequest,
            PurchaseOrder,
            OrderStatus,
            OrderId,
            MerchantRef,
            WebhookAck,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "orders", description = "Purchase-order operations"),
        (name = "webhooks", description = "Provider webhook receiver"),
    )
)]
pub struct ApiDoc;
