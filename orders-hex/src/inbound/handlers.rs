//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use orders_types::{AppError, CreateOrderRequest, OrderRepository, WebhookAck};

use crate::OrderService;

/// Header carrying the provider's HMAC signature over the request body.
pub const SIGNATURE_HEADER: &str = "X-Provider-Signature";

/// Application state shared across handlers.
pub struct AppState<R: OrderRepository> {
    pub service: OrderService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InvalidSignature => {
                (StatusCode::BAD_REQUEST, "invalid_signature".to_string())
            }
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Create a new purchase order.
#[tracing::instrument(skip(state, req), fields(amount = %req.amount))]
pub async fn create_order<R: OrderRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.service.create_order(req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Get a purchase order by merchant reference.
#[tracing::instrument(skip(state), fields(reference = %reference))]
pub async fn get_order<R: OrderRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.service.get_order(&reference).await?;
    Ok(Json(order))
}

/// Provider webhook receiver.
///
/// Takes the raw body so the signature is computed over the exact bytes the
/// provider sent. Any processed-or-ignored event is acknowledged with 200;
/// the provider must not keep retrying conditions this system cannot
/// resolve.
#[tracing::instrument(skip_all)]
pub async fn provider_webhook<R: OrderRepository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    let disposition = state.service.handle_webhook(&body, signature).await?;
    tracing::info!(disposition = %disposition, "Webhook acknowledged");
    Ok(Json(WebhookAck::ok()))
}
