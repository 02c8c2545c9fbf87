//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::TokenAmount;

/// Request to create a new purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Token amount as a decimal string with up to 8 fractional digits
    /// (JSON numbers are also accepted)
    #[schema(value_type = String, example = "1.5")]
    pub amount: TokenAmount,
    /// Opaque merchant metadata stored with the order
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}

/// Acknowledgment returned to the provider for any processed-or-ignored
/// webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    #[schema(example = "ok")]
    pub status: String,
}

impl WebhookAck {
    /// The standard success acknowledgment.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
