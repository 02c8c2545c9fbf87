//! Database row types and their conversion into domain types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use orders_types::{MerchantRef, OrderId, OrderStatus, PurchaseOrder, RepoError, TokenAmount};

/// Raw `purchase_orders` row.
#[derive(Debug, FromRow)]
pub(crate) struct DbOrder {
    pub id: String,
    pub merchant_ref: String,
    pub status: String,
    pub amount: String,
    pub metadata: String,
    pub provider_payment_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl DbOrder {
    pub(crate) fn into_domain(self) -> Result<PurchaseOrder, RepoError> {
        let id = Uuid::parse_str(&self.id).map_err(|e| RepoError::Database(e.to_string()))?;
        let merchant_ref = MerchantRef::from_str(&self.merchant_ref).map_err(RepoError::Domain)?;
        let status = OrderStatus::from_str(&self.status).map_err(RepoError::Domain)?;
        let amount = TokenAmount::from_str(&self.amount).map_err(RepoError::Domain)?;
        let metadata =
            serde_json::from_str(&self.metadata).map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(PurchaseOrder::from_parts(
            OrderId::from_uuid(id),
            merchant_ref,
            status,
            amount,
            metadata,
            self.provider_payment_id,
            parse_timestamp(&self.created_at)?,
            parse_timestamp(&self.updated_at)?,
        ))
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::Database(e.to_string()))
}
